//! Bootstrap rows and fallback content.
//!
//! The same content doubles as the fallback served by public read paths when
//! the store cannot be reached.

use chrono::{Local, Utc};

use crate::content::{display_date, NewPhoto, NewUpdateNote, NostalgiaPhoto, UpdateNote};
use crate::ids::PhotoId;

/// Sequence number of the seeded photo.
pub const SEED_PHOTO_SEQUENCE: u64 = 1;

/// The note inserted into an empty store on bootstrap.
#[must_use]
pub fn launch_note() -> NewUpdateNote {
    NewUpdateNote {
        title: "Knight Rehber Başlatıldı".into(),
        content: "Knight Rehber uygulaması yayına alındı! Yeni özellikler yakında eklenecek."
            .into(),
        importance: crate::DEFAULT_IMPORTANCE.into(),
        date: display_date(&Local::now()),
    }
}

/// The photo inserted into an empty store on bootstrap.
#[must_use]
pub fn seed_photo() -> NewPhoto {
    NewPhoto {
        title: "Eski Knight Online".into(),
        image_url: "https://via.placeholder.com/300x200/FFD66B/0B0B0B?text=Knight+Rehber".into(),
    }
}

/// Served in place of the update note list when the store is unreachable.
#[must_use]
pub fn fallback_update_notes() -> Vec<UpdateNote> {
    let note = NewUpdateNote {
        title: "Hoş Geldiniz!".into(),
        content: "Knight Rehber uygulamasına hoş geldiniz. Yeni özellikler yakında eklenecek."
            .into(),
        importance: crate::DEFAULT_IMPORTANCE.into(),
        date: display_date(&Local::now()),
    };
    vec![UpdateNote::from_new(1, note, Utc::now())]
}

/// Served in place of the photo list when the store is unreachable.
#[must_use]
pub fn fallback_photos() -> Vec<NostalgiaPhoto> {
    vec![NostalgiaPhoto::from_new(
        PhotoId::from_sequence(SEED_PHOTO_SEQUENCE),
        seed_photo(),
        Utc::now(),
    )]
}
