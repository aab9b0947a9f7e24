pub mod handlers;
mod model;
mod routes;

pub use model::{
    FindNotesResponse, Note, NoteDraft, NoteSummary, Priority, Properties, SaveNote, Status, ToggleChecked,
    ToggleResponse,
};
pub use routes::router;
