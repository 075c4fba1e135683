pub mod children;
pub mod event;
pub mod payload;

pub use children::{
    EventCategory, EventLocation, EventPrice, EventQuestion, EventSpeaker, EventTag,
    GalleryImage, LocationInput,
};
pub use event::{Event, EventDetails, EventType};
pub use payload::{CreateEventPayload, EventCollections, UpdateEventPayload};
