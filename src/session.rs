//! # Photo Session
//!
//! State of one user's upload → detect → compose round, held in an explicit context
//! instead of module globals.
//!
//! Every upload bumps a generation counter. Work started for an older upload (a slow
//! decode, a face detection that resolves late) carries the [`Generation`] it was
//! started with, and its result is dropped if a newer upload has begun since.

use image::RgbaImage;
use studio_compose::landmarks::Point;
use tracing::debug;

/// Token identifying one upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

#[derive(Debug, Default)]
pub struct PhotoSession {
    generation: u64,
    photo: Option<RgbaImage>,
    detections: Vec<Point>,
}

impl PhotoSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new upload. Clears the previous photo and detections and invalidates
    /// every outstanding [`Generation`].
    pub fn begin_upload(&mut self) -> Generation {
        self.generation += 1;
        self.photo = None;
        self.detections.clear();
        Generation(self.generation)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.generation
    }

    /// Stores the decoded photo. Returns `false` and drops it if `generation` is stale.
    pub fn finish_upload(&mut self, generation: Generation, photo: RgbaImage) -> bool {
        if !self.is_current(generation) {
            debug!(stale = generation.0, current = self.generation, "dropping stale photo");
            return false;
        }
        self.photo = Some(photo);
        true
    }

    /// Stores landmark points for the current photo. Returns `false` if `generation`
    /// is stale or the photo has not arrived yet.
    pub fn attach_detections(&mut self, generation: Generation, points: Vec<Point>) -> bool {
        if !self.is_current(generation) || self.photo.is_none() {
            debug!(stale = generation.0, current = self.generation, "dropping detections");
            return false;
        }
        self.detections = points;
        true
    }

    pub fn photo(&self) -> Option<&RgbaImage> {
        self.photo.as_ref()
    }

    pub fn detections(&self) -> &[Point] {
        &self.detections
    }

    /// A poster can be generated once there is a photo and a non-blank name.
    pub fn ready_to_generate(&self, name: &str) -> bool {
        self.photo.is_some() && !name.trim().is_empty()
    }

    /// Back to the empty state. Outstanding generations become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.photo = None;
        self.detections.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(shade: u8) -> RgbaImage {
        RgbaImage::from_pixel(4, 4, image::Rgba([shade, shade, shade, 255]))
    }

    #[test]
    fn test_latest_upload_wins() {
        let mut session = PhotoSession::new();
        let first = session.begin_upload();
        let second = session.begin_upload();

        assert!(session.finish_upload(second, photo(200)));
        // the first upload resolves late and must not replace the newer photo
        assert!(!session.finish_upload(first, photo(10)));
        assert_eq!(session.photo().unwrap().get_pixel(0, 0)[0], 200);
    }

    #[test]
    fn test_stale_detections_ignored() {
        let mut session = PhotoSession::new();
        let first = session.begin_upload();
        assert!(session.finish_upload(first, photo(1)));

        let second = session.begin_upload();
        assert!(!session.attach_detections(first, vec![Point { x: 1.0, y: 1.0 }]));
        assert!(session.detections().is_empty());

        // detections before the photo arrive are dropped too
        assert!(!session.attach_detections(second, vec![Point { x: 2.0, y: 2.0 }]));
        assert!(session.finish_upload(second, photo(2)));
        assert!(session.attach_detections(second, vec![Point { x: 3.0, y: 3.0 }]));
        assert_eq!(session.detections().len(), 1);
    }

    #[test]
    fn test_ready_to_generate() {
        let mut session = PhotoSession::new();
        assert!(!session.ready_to_generate("Jane"));
        let generation = session.begin_upload();
        session.finish_upload(generation, photo(0));
        assert!(!session.ready_to_generate("   "));
        assert!(session.ready_to_generate("Jane"));
    }

    #[test]
    fn test_reset_invalidates() {
        let mut session = PhotoSession::new();
        let generation = session.begin_upload();
        session.reset();
        assert!(!session.is_current(generation));
        assert!(!session.finish_upload(generation, photo(0)));
        assert!(session.photo().is_none());
    }
}
