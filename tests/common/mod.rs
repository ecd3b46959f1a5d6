#![allow(dead_code)]

use event_booking::database::{Database, DatabaseInfo};
use event_booking::models::DataCreateEvent;

pub async fn reference_db() -> Database {
    DatabaseInfo::Reference
        .connect()
        .await
        .expect("reference database always connects")
}

pub fn event_data(title: &str) -> DataCreateEvent {
    DataCreateEvent {
        title: title.to_string(),
        description: "A full day of talks about systems programming.".to_string(),
        overview: "Talks, workshops and networking".to_string(),
        image: "/images/event1.png".to_string(),
        venue: "Moscone Center".to_string(),
        location: "San Francisco, CA".to_string(),
        date: "March 5, 2025".to_string(),
        time: "9:30 AM".to_string(),
        mode: "hybrid".to_string(),
        audience: "Developers".to_string(),
        agenda: vec!["Keynote".to_string(), "Workshops".to_string()],
        organizer: "Rust Foundation".to_string(),
        tags: vec!["rust".to_string(), "systems".to_string()],
    }
}
