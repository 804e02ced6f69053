use crate::escape::escape_html;
use crate::foundation::core::NodeId;
use crate::foundation::error::{TimelineError, TimelineResult};
use crate::model::TimelineDataset;
use crate::surface::Surface;

pub const ROOT_ID: &str = "timeline";
pub const FRAMES_ID: &str = "frames";
pub const CONTROL_ID: &str = "control";

/// Visual class of a frame element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameClass {
    Active,
    Staged,
    Inactive,
}

impl FrameClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "frame active",
            Self::Staged => "frame staged",
            Self::Inactive => "frame inactive",
        }
    }
}

/// Element handles of the mounted widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mounted {
    pub root: NodeId,
    pub frames: NodeId,
    pub control: NodeId,
}

/// Materializes the widget on a [`Surface`].
///
/// Frame element 0 is the title; frame element `i + 1` shows event `i`.
#[derive(Debug, Default)]
pub struct Renderer {
    mounted: Option<Mounted>,
    frames: Vec<NodeId>,
    active: Option<usize>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mounted(&self) -> Option<Mounted> {
        self.mounted
    }

    /// Frame elements in display order, title first.
    pub fn frame_nodes(&self) -> &[NodeId] {
        &self.frames
    }

    /// Index of the frame element currently marked active.
    pub fn active_frame(&self) -> Option<usize> {
        self.active
    }

    /// Mount the widget skeleton under `container`. Returns `false` when already mounted.
    pub fn mount(&mut self, surface: &mut dyn Surface, container: NodeId) -> TimelineResult<bool> {
        if self.mounted.is_some() {
            return Ok(false);
        }

        let root = surface.create_element("div")?;
        surface.set_id(root, ROOT_ID)?;
        let frames = surface.create_element("div")?;
        surface.set_id(frames, FRAMES_ID)?;
        let control = surface.create_element("button")?;
        surface.set_id(control, CONTROL_ID)?;
        surface.append_child(root, frames)?;
        surface.append_child(root, control)?;
        surface.append_child(container, root)?;
        surface.listen_click(control)?;

        self.mounted = Some(Mounted {
            root,
            frames,
            control,
        });
        Ok(true)
    }

    fn require_mounted(&self) -> TimelineResult<Mounted> {
        self.mounted
            .ok_or_else(|| TimelineError::render("timeline is not mounted"))
    }

    /// Replace the frame elements with a title frame followed by one frame per event.
    pub fn build_frames(
        &mut self,
        surface: &mut dyn Surface,
        dataset: &TimelineDataset,
    ) -> TimelineResult<()> {
        let m = self.require_mounted()?;
        surface.clear_children(m.frames)?;
        self.frames.clear();

        let title = surface.create_element("div")?;
        surface.set_class(title, FrameClass::Active.as_str())?;
        surface.set_markup(title, &title_markup(dataset))?;
        surface.append_child(m.frames, title)?;
        self.frames.push(title);

        for i in 0..dataset.events.len() {
            let frame = surface.create_element("div")?;
            surface.set_class(frame, FrameClass::Staged.as_str())?;
            surface.set_markup(frame, &event_markup(dataset, i))?;
            surface.append_child(m.frames, frame)?;
            self.frames.push(frame);
        }

        self.active = Some(0);
        tracing::debug!(frames = self.frames.len(), "frames built");
        Ok(())
    }

    /// Replace the frames with an error notice.
    pub fn show_error(&mut self, surface: &mut dyn Surface, reason: &str) -> TimelineResult<()> {
        let m = self.require_mounted()?;
        surface.clear_children(m.frames)?;
        self.frames.clear();
        self.active = None;

        let notice = surface.create_element("div")?;
        surface.set_class(notice, "frame error")?;
        surface.set_text(notice, &format!("Timeline unavailable: {reason}"))?;
        surface.append_child(m.frames, notice)?;
        Ok(())
    }

    pub fn set_control_label(&self, surface: &mut dyn Surface, label: &str) -> TimelineResult<()> {
        match self.mounted {
            Some(m) => surface.set_text(m.control, label),
            None => Ok(()),
        }
    }

    /// Move the active mark to frame element `index`, touching only the old and new elements.
    pub fn activate(&mut self, surface: &mut dyn Surface, index: usize) -> TimelineResult<()> {
        let Some(&next) = self.frames.get(index) else {
            return Err(TimelineError::render(format!(
                "frame {index} is out of range ({} frames)",
                self.frames.len()
            )));
        };
        if self.active == Some(index) {
            return Ok(());
        }
        if let Some(prev) = self.active.and_then(|i| self.frames.get(i).copied()) {
            surface.set_class(prev, FrameClass::Inactive.as_str())?;
        }
        surface.set_class(next, FrameClass::Active.as_str())?;
        self.active = Some(index);
        Ok(())
    }

    /// Put every frame back to its initial look: title active, the rest staged.
    pub fn restage(&mut self, surface: &mut dyn Surface) -> TimelineResult<()> {
        for (i, &frame) in self.frames.iter().enumerate() {
            let class = if i == 0 {
                FrameClass::Active
            } else {
                FrameClass::Staged
            };
            surface.set_class(frame, class.as_str())?;
        }
        self.active = (!self.frames.is_empty()).then_some(0);
        Ok(())
    }
}

fn title_markup(dataset: &TimelineDataset) -> String {
    let name = dataset.full_name();
    escape_html(&name).into_owned()
}

fn event_markup(dataset: &TimelineDataset, index: usize) -> String {
    let event = &dataset.events[index];
    escape_html(&event.caption(&dataset.first_name)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Event;
    use crate::surface::MemorySurface;

    fn dataset() -> TimelineDataset {
        TimelineDataset {
            first_name: "Chip".to_owned(),
            last_name: "Bitly".to_owned(),
            age: 46.0,
            events: vec![
                Event {
                    age: 0.0,
                    content: "was born".to_owned(),
                },
                Event {
                    age: 4.0,
                    content: "<script>alert('x')</script>".to_owned(),
                },
            ],
        }
    }

    fn mounted() -> (MemorySurface, Renderer) {
        let mut s = MemorySurface::new();
        let mut r = Renderer::new();
        let body = s.document_root();
        assert!(r.mount(&mut s, body).unwrap());
        (s, r)
    }

    #[test]
    fn mount_is_idempotent() {
        let (mut s, mut r) = mounted();
        let body = s.document_root();
        assert!(!r.mount(&mut s, body).unwrap());
        assert_eq!(s.children(body).len(), 1);
        assert!(s.is_clickable(r.mounted().unwrap().control));
    }

    #[test]
    fn frames_are_escaped() {
        let (mut s, mut r) = mounted();
        r.build_frames(&mut s, &dataset()).unwrap();
        let frames = r.frame_nodes().to_vec();
        assert_eq!(frames.len(), 3);
        assert_eq!(s.inner_html(frames[0]), "Chip Bitly");
        assert_eq!(s.inner_html(frames[1]), "At age 0, Chip was born");
        assert_eq!(
            s.inner_html(frames[2]),
            "At age 4, Chip &lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
        assert_eq!(s.class(frames[0]), Some("frame active"));
        assert_eq!(s.class(frames[2]), Some("frame staged"));
    }

    #[test]
    fn activate_moves_the_mark() {
        let (mut s, mut r) = mounted();
        r.build_frames(&mut s, &dataset()).unwrap();
        let frames = r.frame_nodes().to_vec();
        r.activate(&mut s, 1).unwrap();
        assert_eq!(s.class(frames[0]), Some("frame inactive"));
        assert_eq!(s.class(frames[1]), Some("frame active"));
        assert_eq!(s.class(frames[2]), Some("frame staged"));
        assert!(r.activate(&mut s, 9).is_err());

        r.restage(&mut s).unwrap();
        assert_eq!(s.class(frames[0]), Some("frame active"));
        assert_eq!(s.class(frames[1]), Some("frame staged"));
        assert_eq!(r.active_frame(), Some(0));
    }

    #[test]
    fn unmounted_renderer_refuses_frames_but_ignores_labels() {
        let mut s = MemorySurface::new();
        let mut r = Renderer::new();
        assert!(r.build_frames(&mut s, &dataset()).is_err());
        r.set_control_label(&mut s, "Play").unwrap();
    }

    #[test]
    fn error_notice_is_escaped_text() {
        let (mut s, mut r) = mounted();
        r.show_error(&mut s, "<bad>").unwrap();
        let frames = r.mounted().unwrap().frames;
        assert_eq!(
            s.inner_html(frames),
            r#"<div class="frame error">Timeline unavailable: &lt;bad&gt;</div>"#
        );
        assert!(r.frame_nodes().is_empty());
    }
}
