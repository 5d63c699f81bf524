/// UI widgets for the wizard
///
/// The crop canvas is the only custom widget; everything else is plain
/// iced layout built in main.rs.

pub mod crop_canvas;
