use acadme_client::content::{ContentDetail, ContentKind};
use crossterm::event::{KeyCode, KeyModifiers};
use log::debug;
use ratatui::{
    prelude::{Margin, Rect},
    text::{Line, Text},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use crate::{
    event::Event,
    main_screen::{
        panes::{Document, Pane},
        Action,
    },
    store::{ContentState, Store},
    styles::{dim, error_text, heading, key},
};

pub struct ContentViewer {
    content_id: String,

    /// Scroll status
    y_offset: u16,
    jump_y_offset: u16,

    /// A cached render of the loaded content, to avoid re-rendering the HTML every frame.
    cached_render: Option<Paragraph<'static>>,

    /// A list of links we're displaying. The user can specify an index to visit them
    displayed_links: Vec<String>,

    /// State for link entry
    link_idx_max_digits: usize,
    link_entry_acc: usize,
    link_entry_digits: Option<usize>,
}

impl ContentViewer {
    pub(crate) fn new(content_id: String) -> ContentViewer {
        Self {
            content_id,
            y_offset: 0,
            jump_y_offset: 0,
            cached_render: None,
            displayed_links: vec![],
            link_idx_max_digits: 0,
            link_entry_acc: 0,
            link_entry_digits: None,
        }
    }

    /// Render the content item, if it is loaded
    fn render_content(&mut self, store: &Store) -> Paragraph<'static> {
        let Some(view) = store.content().filter(|c| c.content_id == self.content_id) else {
            self.cached_render = None;
            return login_required();
        };

        match &view.state {
            ContentState::Loading => Paragraph::new(Line::styled("Loading...", dim())),
            ContentState::LoginRequired => login_required(),
            ContentState::Failed(e) => {
                Paragraph::new(error_text(format!("Error loading content: {e}")))
            }
            ContentState::Loaded(c) => {
                if let Some(p) = &self.cached_render {
                    return p.clone();
                }

                let (text, links) = render_detail(c);
                self.set_displayed_links(links);
                let p = Paragraph::new(text).wrap(Wrap { trim: false });
                self.cached_render = Some(p.clone());
                p
            }
        }
    }

    fn set_displayed_links(&mut self, links: Vec<String>) {
        self.link_idx_max_digits = if !links.is_empty() {
            links.len().ilog10() as usize + 1
        } else {
            0
        };
        self.displayed_links = links;
        self.link_entry_acc = 0;
        self.link_entry_digits = None;
        debug!(
            "displaying {} links (max digits = {})",
            self.displayed_links.len(),
            self.link_idx_max_digits
        );
    }

    fn open_referenced_link(&mut self) -> Action {
        let Some(href) = self.displayed_links.get(self.link_entry_acc) else {
            return Action::Flash(error_text("No link found".to_string()));
        };

        if let Err(e) = open::that(href) {
            return Action::Flash(error_text(format!("Error opening in browser: {e}")));
        }

        self.link_entry_acc = 0;
        self.link_entry_digits = None;

        Action::Flash(format!("Opened {href} in browser").into())
    }

    fn loaded<'a>(&self, store: &'a Store) -> Option<&'a ContentDetail> {
        match &store.content().filter(|c| c.content_id == self.content_id)?.state {
            ContentState::Loaded(c) => Some(c),
            _ => None,
        }
    }

    /// Go back to the course this content is from
    fn back(&self, store: &mut Store) -> Action {
        store.close_content();
        match store.course() {
            Some(c) => Action::Show(Document::Course(c.course_id().to_string())),
            None => Action::FocusNavigation,
        }
    }
}

/// The content's title, then its body
fn render_detail(c: &ContentDetail) -> (Text<'static>, Vec<String>) {
    let mut lines = vec![Line::styled(c.name.clone(), heading()), Line::raw("")];
    match c.kind {
        ContentKind::Html => {
            let (body, links) = htmlview::render_text(&c.content);
            lines.extend(body.lines);
            (Text::from(lines), links)
        }
        ContentKind::Video => {
            let url = c.video_url().unwrap_or_else(|| c.content.clone());
            lines.push(Line::raw(format!("Video: {url}")));
            lines.push(Line::from(vec![
                key("b"),
                " to watch it in your browser".into(),
            ]));
            (Text::from(lines), vec![])
        }
    }
}

fn login_required() -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::raw("You need to be logged in to view this."),
        Line::from(vec!["Press ".into(), key("L"), " to log in.".into()]),
    ])
}

impl Pane for ContentViewer {
    fn draw(&mut self, store: &Store, frame: &mut Frame, area: Rect) {
        let rendered = self.render_content(store);

        let line_count = rendered.line_count(area.width.saturating_sub(2));
        self.jump_y_offset = area.height / 2;

        let max_y_offset = (line_count as u16).saturating_sub(area.height);
        self.y_offset = self.y_offset.min(max_y_offset);

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state =
            ScrollbarState::new(max_y_offset as usize).position(self.y_offset as usize);

        frame.render_widget(
            rendered.scroll((self.y_offset, 0)),
            area.inner(&Margin {
                vertical: 0,
                horizontal: 1,
            }),
        );
        frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }

    fn handle_event(&mut self, store: &mut Store, event: Event) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return self.back(store),
            KeyCode::Char('L') => return Action::Login,

            // Basic vim-like navigation
            KeyCode::Char('g') => self.y_offset = 0,
            KeyCode::Char('G') => self.y_offset = u16::MAX,

            KeyCode::Char('j') | KeyCode::Down => self.y_offset = self.y_offset.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => self.y_offset = self.y_offset.saturating_sub(1),

            KeyCode::Char('u') | KeyCode::Char('U')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.y_offset = self.y_offset.saturating_sub(self.jump_y_offset)
            }
            KeyCode::Char('d') | KeyCode::Char('D')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.y_offset = self.y_offset.saturating_add(self.jump_y_offset)
            }
            KeyCode::PageUp => self.y_offset = self.y_offset.saturating_sub(self.jump_y_offset),
            KeyCode::PageDown => self.y_offset = self.y_offset.saturating_add(self.jump_y_offset),

            // Watch a video
            KeyCode::Char('b') => {
                self.link_entry_digits = None;
                let Some(url) = self.loaded(store).and_then(|c| c.video_url()) else {
                    return Action::Flash("This isn't a video".into());
                };
                if let Err(e) = open::that(&url) {
                    return Action::Flash(error_text(format!("Error opening in browser: {e}")));
                }
                return Action::Flash(format!("Opened {url} in browser").into());
            }

            KeyCode::Char('m') => {
                self.link_entry_digits = None;
                return store.mark_complete(&self.content_id);
            }

            // Next content item in the course
            KeyCode::Char('n') => {
                self.link_entry_digits = None;
                let Some(next) = store
                    .course()
                    .and_then(|c| c.next_content(&self.content_id))
                    .map(str::to_string)
                else {
                    return Action::Flash("This is the last item in the course".into());
                };
                store.open_content(&next);
                return Action::Show(Document::Content(next));
            }

            // Link index entry
            KeyCode::Char('f') => {
                if self.link_idx_max_digits > 0 {
                    self.link_entry_acc = 0;
                    self.link_entry_digits = Some(0);

                    return Action::Flash(
                        "Go to... (type the number after the link)"
                            .to_string()
                            .into(),
                    );
                }
            }
            KeyCode::Enter if self.link_entry_digits.is_some() => {
                return self.open_referenced_link();
            }

            KeyCode::Char(n) if n.is_ascii_digit() => {
                if let (Some(idx), Some(d)) = (self.link_entry_digits.as_mut(), n.to_digit(10)) {
                    // add new digit to end of number
                    self.link_entry_acc *= 10;
                    self.link_entry_acc += d as usize;
                    *idx += 1;

                    // check if done entering
                    debug!(
                        "entered {idx} digits / {}. acc = {}",
                        self.link_idx_max_digits, self.link_entry_acc
                    );
                    if *idx == self.link_idx_max_digits {
                        return self.open_referenced_link();
                    } else {
                        return Action::Flash(
                            format!(
                                "Go to... {} (RET to open, or keep typing numbers)",
                                self.link_entry_acc
                            )
                            .into(),
                        );
                    }
                }
            }

            _ => (),
        };

        // Every branch where we do more digit entry returns, so if we've stopped doing that then exit that mode
        self.link_entry_digits = None;

        Action::None
    }
}
