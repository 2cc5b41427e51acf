//! Renderer that records frames instead of drawing them

use super::{Camera, FrameSnapshot, Renderer, ViewFrame, ViewHandle, Viewport};
use crate::foundation::math::Vec4;
use image::{Rgba, RgbaImage};

/// Copy of one submitted view
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedView {
    /// View handle
    pub handle: ViewHandle,
    /// Viewport at submission time
    pub viewport: Viewport,
    /// Clear color of the view
    pub clear_color: Vec4,
    /// Name of the active camera
    pub camera_name: String,
    /// Active camera
    pub camera: Camera,
    /// Scene contents
    pub snapshot: FrameSnapshot,
}

/// Backend without a GPU; keeps every completed frame
///
/// Used by tests and the demo to observe what the scene submits.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: Vec<Vec<RecordedView>>,
    pending: Option<Vec<RecordedView>>,
    skip_frames: usize,
}

impl HeadlessRenderer {
    /// Renderer accepting every frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse the next `count` frames in `begin_frame`
    pub fn skip_frames(&mut self, count: usize) {
        self.skip_frames = count;
    }

    /// Completed frames, oldest first
    pub fn frames(&self) -> &[Vec<RecordedView>] {
        &self.frames
    }

    /// Most recent completed frame
    pub fn last_frame(&self) -> Option<&[RecordedView]> {
        self.frames.last().map(Vec::as_slice)
    }

    /// Number of completed frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl Renderer for HeadlessRenderer {
    fn begin_frame(&mut self) -> bool {
        if self.skip_frames > 0 {
            self.skip_frames -= 1;
            log::trace!("Headless renderer skipping frame");
            return false;
        }
        self.pending = Some(Vec::new());
        true
    }

    fn render(&mut self, frame: &ViewFrame<'_>) {
        let Some(pending) = self.pending.as_mut() else {
            log::warn!("render called outside begin_frame/end_frame");
            return;
        };
        pending.push(RecordedView {
            handle: frame.handle,
            viewport: frame.view.viewport,
            clear_color: frame.view.clear_color,
            camera_name: frame.camera_name.to_string(),
            camera: frame.camera.clone(),
            snapshot: frame.snapshot.clone(),
        });
    }

    fn end_frame(&mut self) {
        if let Some(views) = self.pending.take() {
            log::trace!("Headless renderer recorded {} views", views.len());
            self.frames.push(views);
        }
    }

    /// Image of the view's clear color; nothing is rasterized
    fn read_pixels(&mut self, viewport: Viewport) -> Option<RgbaImage> {
        let view = self.last_frame()?.iter().rev().find(|v| v.viewport == viewport)?;
        let channels = view.clear_color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        let pixel = Rgba(channels.into());
        Some(RgbaImage::from_pixel(viewport.width, viewport.height, pixel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::render::View;
    use slotmap::SlotMap;

    #[test]
    fn test_records_views_per_frame() {
        let mut handles: SlotMap<ViewHandle, ()> = SlotMap::with_key();
        let handle = handles.insert(());
        let view = View::new(Viewport::new(0, 0, 4, 4), &ViewConfig::default());
        let camera = Camera::default();
        let snapshot = FrameSnapshot::default();

        let mut renderer = HeadlessRenderer::new();
        assert!(renderer.begin_frame());
        renderer.render(&ViewFrame {
            handle,
            view: &view,
            camera_name: "main",
            camera: &camera,
            snapshot: &snapshot,
        });
        renderer.end_frame();

        assert_eq!(renderer.frame_count(), 1);
        let frame = renderer.last_frame().unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].camera_name, "main");
    }

    #[test]
    fn test_read_pixels_returns_cleared_viewport() {
        let mut handles: SlotMap<ViewHandle, ()> = SlotMap::with_key();
        let handle = handles.insert(());
        let config = ViewConfig {
            clear_color: [1.0, 0.0, 0.5, 1.0],
            ..Default::default()
        };
        let view = View::new(Viewport::new(0, 0, 8, 4), &config);
        let camera = Camera::default();
        let snapshot = FrameSnapshot::default();

        let mut renderer = HeadlessRenderer::new();
        assert!(renderer.read_pixels(view.viewport).is_none());
        assert!(renderer.begin_frame());
        renderer.render(&ViewFrame {
            handle,
            view: &view,
            camera_name: "main",
            camera: &camera,
            snapshot: &snapshot,
        });
        renderer.end_frame();

        let image = renderer.read_pixels(view.viewport).unwrap();
        assert_eq!(image.dimensions(), (8, 4));
        assert_eq!(image.get_pixel(7, 3), &Rgba([255, 0, 128, 255]));
        assert!(renderer.read_pixels(Viewport::new(0, 0, 2, 2)).is_none());
    }

    #[test]
    fn test_skipped_frames_are_not_recorded() {
        let mut renderer = HeadlessRenderer::new();
        renderer.skip_frames(1);
        assert!(!renderer.begin_frame());
        renderer.end_frame();
        assert_eq!(renderer.frame_count(), 0);
        assert!(renderer.begin_frame());
        renderer.end_frame();
        assert_eq!(renderer.frame_count(), 1);
    }
}
