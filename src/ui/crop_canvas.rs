/// Interactive crop overlay
///
/// Drawn on top of the preview image: the area outside the crop rectangle
/// is dimmed and the rectangle itself gets a stroked border. Mouse events
/// feed the drag controller; moves are emitted as already-clamped positions
/// so the application just stores them.

use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Program};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use crate::crop::drag::DragController;
use crate::crop::{CropArea, DisplayImage};
use crate::Message;

pub struct CropCanvas<'a> {
    pub image: &'a DisplayImage,
    pub area: &'a CropArea,
}

impl<'a> Program<Message> for CropCanvas<'a> {
    type State = DragController;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let dim = Color::from_rgba(0.0, 0.0, 0.0, 0.45);
        let area = self.area;

        // Four dimmed bands around the rectangle
        frame.fill_rectangle(
            Point::ORIGIN,
            Size::new(bounds.width, area.y),
            dim,
        );
        frame.fill_rectangle(
            Point::new(0.0, area.y + area.height),
            Size::new(bounds.width, (bounds.height - area.y - area.height).max(0.0)),
            dim,
        );
        frame.fill_rectangle(
            Point::new(0.0, area.y),
            Size::new(area.x, area.height),
            dim,
        );
        frame.fill_rectangle(
            Point::new(area.x + area.width, area.y),
            Size::new((bounds.width - area.x - area.width).max(0.0), area.height),
            dim,
        );

        frame.stroke(
            &canvas::Path::rectangle(
                Point::new(area.x, area.y),
                Size::new(area.width, area.height),
            ),
            canvas::Stroke::default()
                .with_color(Color::WHITE)
                .with_width(2.0),
        );

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(pos) = cursor.position_in(bounds) {
                    if state.press(pos.x, pos.y, self.area) {
                        return (canvas::event::Status::Captured, None);
                    }
                }
            }

            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.is_dragging() {
                    if let Some(pos) = cursor.position_in(bounds) {
                        if let Some((x, y)) = state.drag(pos.x, pos.y, self.area, self.image) {
                            // Last-write-wins: every move replaces the position
                            return (
                                canvas::event::Status::Captured,
                                Some(Message::CropMoved(x, y)),
                            );
                        }
                    }
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if state.is_dragging() {
                    state.release();
                    return (canvas::event::Status::Captured, None);
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if state.is_dragging() {
            return mouse::Interaction::Grabbing;
        }
        if let Some(pos) = cursor.position_in(bounds) {
            let area = self.area;
            let inside = pos.x >= area.x
                && pos.x <= area.x + area.width
                && pos.y >= area.y
                && pos.y <= area.y + area.height;
            if inside {
                return mouse::Interaction::Grab;
            }
        }
        mouse::Interaction::default()
    }
}
