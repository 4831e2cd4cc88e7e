use acadme_client::Client;
use log::debug;
use std::sync::mpsc::{channel, Receiver, Sender};

use super::{Event, Request};
use crate::event::{Event as CrateEvent, EventBus};

/// Performs requests it receives from the main thread, and sends the results back.
pub struct Worker {
    client: Client,
    msg_recv: Receiver<Request>,
    event_send: Sender<CrateEvent>,
}

impl Worker {
    /// Spawn the store worker on the given event bus, returning a channel to send commands down.
    pub(crate) fn spawn_on(bus: &EventBus, client: Client) -> Sender<Request> {
        let (cmd_send, cmd_recv) = channel();

        bus.spawn("store_worker", move |_, event_send| {
            // we don't need running because the receiver will raise an error and we'll exit
            Worker {
                client,
                msg_recv: cmd_recv,
                event_send,
            }
            .main()
        });

        cmd_send
    }

    fn main(self) {
        while let Ok(msg) = self.msg_recv.recv() {
            debug!("received message: {:?}", msg);
            let event = self.process_msg(msg);
            if let Err(e) = self.event_send.send(CrateEvent::Store(event)) {
                debug!("error sending event: {:?}", e);
                break;
            }
        }

        debug!("shutting down");
    }

    fn process_msg(&self, msg: Request) -> Event {
        match msg {
            Request::Categories => Event::Categories(self.client.categories()),
            Request::Tutors => Event::Tutors(self.client.tutors()),
            Request::CoursePage {
                category_id,
                category_name,
                page,
            } => Event::CoursePage {
                result: self.client.category_page(&category_name, page),
                category_id,
                page,
            },
            Request::Search { seq, filter } => Event::Search {
                seq,
                result: self.client.search(&filter, 1),
            },
            Request::CourseDetail { course_id } => Event::CourseDetail {
                result: self.client.course_detail(&course_id),
                course_id,
            },
            Request::CourseProgress { course_id, token } => Event::CourseProgress {
                result: self.client.course_progress(&course_id, &token),
                course_id,
            },
            Request::Content { content_id, token } => Event::Content {
                result: self.client.content(&content_id, &token),
                content_id,
            },
            Request::MarkComplete {
                course_id,
                content_id,
                token,
            } => Event::MarkedComplete {
                result: self.client.mark_complete(&content_id, &token),
                course_id,
                content_id,
            },
            Request::Enroll { course_id, token } => Event::Enrolled {
                result: self.client.enroll(&course_id, &token),
                course_id,
            },
            Request::Profile { username } => Event::Profile {
                result: self.client.profile(&username),
                username,
            },
        }
    }
}
