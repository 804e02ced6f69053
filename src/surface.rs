use crate::escape::escape_html_into;
use crate::foundation::core::NodeId;
use crate::foundation::error::{TimelineError, TimelineResult};

/// Rendering target contract.
///
/// A surface owns a tree of elements addressed by [`NodeId`]. `set_markup` inserts its argument
/// verbatim, so callers must escape untrusted text first; `set_text` escapes on its own.
pub trait Surface {
    /// Default container used when `render` is not given one (the document body).
    fn document_root(&self) -> NodeId;
    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> TimelineResult<NodeId>;
    /// Set the stable identifier used by [`Surface::query`].
    fn set_id(&mut self, node: NodeId, id: &str) -> TimelineResult<()>;
    /// Replace the element's class list.
    fn set_class(&mut self, node: NodeId, class: &str) -> TimelineResult<()>;
    /// Replace the element's content with plain text.
    fn set_text(&mut self, node: NodeId, text: &str) -> TimelineResult<()>;
    /// Replace the element's content with trusted markup.
    fn set_markup(&mut self, node: NodeId, markup: &str) -> TimelineResult<()>;
    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> TimelineResult<()>;
    /// Detach every child of `node`.
    fn clear_children(&mut self, node: NodeId) -> TimelineResult<()>;
    /// Find a descendant of `scope` by identifier.
    fn query(&self, scope: NodeId, id: &str) -> Option<NodeId>;
    /// Route clicks on `node` to the host's event queue.
    fn listen_click(&mut self, node: NodeId) -> TimelineResult<()>;
}

#[derive(Clone, Debug)]
enum Content {
    Children(Vec<NodeId>),
    Text(String),
    Markup(String),
}

#[derive(Clone, Debug)]
struct Element {
    tag: String,
    id: Option<String>,
    class: String,
    parent: Option<NodeId>,
    content: Content,
    clickable: bool,
}

/// In-memory element tree for tests, headless playback and HTML snapshots.
#[derive(Clone, Debug)]
pub struct MemorySurface {
    elements: Vec<Element>,
    body: NodeId,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    /// Create a surface holding an empty `body` element.
    pub fn new() -> Self {
        let body = Element {
            tag: "body".to_owned(),
            id: None,
            class: String::new(),
            parent: None,
            content: Content::Children(Vec::new()),
            clickable: false,
        };
        Self {
            elements: vec![body],
            body: NodeId(0),
        }
    }

    fn el(&self, node: NodeId) -> TimelineResult<&Element> {
        self.elements
            .get(node.0 as usize)
            .ok_or_else(|| TimelineError::render(format!("unknown node {}", node.0)))
    }

    fn el_mut(&mut self, node: NodeId) -> TimelineResult<&mut Element> {
        self.elements
            .get_mut(node.0 as usize)
            .ok_or_else(|| TimelineError::render(format!("unknown node {}", node.0)))
    }

    fn detach_all(&mut self, node: NodeId) -> TimelineResult<()> {
        let old = std::mem::replace(&mut self.el_mut(node)?.content, Content::Children(Vec::new()));
        if let Content::Children(children) = old {
            for c in children {
                self.el_mut(c)?.parent = None;
            }
        }
        Ok(())
    }

    /// Parent of `node`, if attached.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.elements.get(node.0 as usize)?.parent
    }

    /// Attached children of `node` in order. Empty when the node holds text or markup.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        match self.elements.get(node.0 as usize).map(|e| &e.content) {
            Some(Content::Children(c)) => c.as_slice(),
            _ => &[],
        }
    }

    /// Current class list of `node`.
    pub fn class(&self, node: NodeId) -> Option<&str> {
        self.elements.get(node.0 as usize).map(|e| e.class.as_str())
    }

    pub fn is_clickable(&self, node: NodeId) -> bool {
        self.elements
            .get(node.0 as usize)
            .is_some_and(|e| e.clickable)
    }

    /// Serialized content of `node`, like `innerHTML`.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_inner(&mut out, node);
        out
    }

    /// Serialized element including its own tag, like `outerHTML`.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_outer(&mut out, node);
        out
    }

    fn write_outer(&self, out: &mut String, node: NodeId) {
        let Some(el) = self.elements.get(node.0 as usize) else {
            return;
        };
        out.push('<');
        out.push_str(&el.tag);
        if let Some(id) = &el.id {
            out.push_str(" id=\"");
            escape_html_into(out, id);
            out.push('"');
        }
        if !el.class.is_empty() {
            out.push_str(" class=\"");
            escape_html_into(out, &el.class);
            out.push('"');
        }
        out.push('>');
        self.write_inner(out, node);
        out.push_str("</");
        out.push_str(&el.tag);
        out.push('>');
    }

    fn write_inner(&self, out: &mut String, node: NodeId) {
        let Some(el) = self.elements.get(node.0 as usize) else {
            return;
        };
        match &el.content {
            Content::Children(children) => {
                for &c in children {
                    self.write_outer(out, c);
                }
            }
            Content::Text(t) => escape_html_into(out, t),
            Content::Markup(m) => out.push_str(m),
        }
    }
}

impl Surface for MemorySurface {
    fn document_root(&self) -> NodeId {
        self.body
    }

    fn create_element(&mut self, tag: &str) -> TimelineResult<NodeId> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TimelineError::render(format!("invalid tag name '{tag}'")));
        }
        let id = u32::try_from(self.elements.len())
            .map_err(|_| TimelineError::render("element arena is full"))?;
        self.elements.push(Element {
            tag: tag.to_owned(),
            id: None,
            class: String::new(),
            parent: None,
            content: Content::Children(Vec::new()),
            clickable: false,
        });
        Ok(NodeId(id))
    }

    fn set_id(&mut self, node: NodeId, id: &str) -> TimelineResult<()> {
        self.el_mut(node)?.id = Some(id.to_owned());
        Ok(())
    }

    fn set_class(&mut self, node: NodeId, class: &str) -> TimelineResult<()> {
        self.el_mut(node)?.class = class.to_owned();
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> TimelineResult<()> {
        self.detach_all(node)?;
        self.el_mut(node)?.content = Content::Text(text.to_owned());
        Ok(())
    }

    fn set_markup(&mut self, node: NodeId, markup: &str) -> TimelineResult<()> {
        self.detach_all(node)?;
        self.el_mut(node)?.content = Content::Markup(markup.to_owned());
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> TimelineResult<()> {
        if parent == child {
            return Err(TimelineError::render("cannot append a node to itself"));
        }
        self.el(parent)?;
        let old_parent = self.el(child)?.parent;
        if let Some(old) = old_parent
            && let Content::Children(siblings) = &mut self.el_mut(old)?.content
        {
            siblings.retain(|&n| n != child);
        }

        let p = self.el_mut(parent)?;
        match &mut p.content {
            Content::Children(children) => children.push(child),
            content => *content = Content::Children(vec![child]),
        }
        self.el_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn clear_children(&mut self, node: NodeId) -> TimelineResult<()> {
        self.detach_all(node)
    }

    fn query(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            let el = self.elements.get(n.0 as usize)?;
            if el.id.as_deref() == Some(id) {
                return Some(n);
            }
            stack.extend(self.children(n).iter().rev().copied());
        }
        None
    }

    fn listen_click(&mut self, node: NodeId) -> TimelineResult<()> {
        self.el_mut(node)?.clickable = true;
        Ok(())
    }
}
