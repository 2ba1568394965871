//! Pane layout tree.
//!
//! The editor area is a recursive split layout: leaves are tab groups holding
//! an ordered list of views, interior nodes split their children horizontally
//! or vertically. All structure queries and mutations are structural recursion
//! over [`PaneNode`]; removing a group collapses single-child splits so the
//! tree never holds degenerate nodes.

use crate::workspace::{PaneId, ViewId};

/// Split orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    /// Children side by side.
    Horizontal,
    /// Children stacked.
    Vertical,
}

/// A leaf pane: an ordered tab strip of views with one active tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabGroup {
    /// Stable pane identity.
    pub id: PaneId,
    /// Views in tab order.
    pub tabs: Vec<ViewId>,
    /// Index of the active tab; 0 when the group is empty.
    pub active: usize,
}

impl TabGroup {
    /// New empty group.
    pub fn new(id: PaneId) -> Self {
        Self {
            id,
            tabs: Vec::new(),
            active: 0,
        }
    }

    /// The active view, if the group has any tabs.
    pub fn active_view(&self) -> Option<ViewId> {
        self.tabs.get(self.active).copied()
    }

    /// Append a tab and make it active.
    pub fn push_tab(&mut self, view: ViewId) {
        self.tabs.push(view);
        self.active = self.tabs.len() - 1;
    }

    /// Remove a tab, keeping `active` on a valid neighbor. Returns whether
    /// the view was present.
    pub fn remove_tab(&mut self, view: ViewId) -> bool {
        let Some(index) = self.tabs.iter().position(|v| *v == view) else {
            return false;
        };
        self.tabs.remove(index);
        if self.active > index || self.active >= self.tabs.len() {
            self.active = self.active.saturating_sub(1);
        }
        true
    }

    /// Make `view` the active tab. Returns whether the view was present.
    pub fn activate_tab(&mut self, view: ViewId) -> bool {
        match self.tabs.iter().position(|v| *v == view) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }
}

/// One node of the layout tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneNode {
    /// A tab group.
    Leaf(TabGroup),
    /// A split; always at least two children.
    Split {
        /// Orientation of this split.
        direction: SplitDirection,
        /// Child panes in visual order.
        children: Vec<PaneNode>,
    },
}

impl PaneNode {
    /// All tab groups, left to right / top to bottom.
    pub fn groups(&self) -> Vec<&TabGroup> {
        let mut out = Vec::new();
        self.collect_groups(&mut out);
        out
    }

    fn collect_groups<'a>(&'a self, out: &mut Vec<&'a TabGroup>) {
        match self {
            Self::Leaf(group) => out.push(group),
            Self::Split { children, .. } => {
                for child in children {
                    child.collect_groups(out);
                }
            }
        }
    }

    /// The group with the given id.
    pub fn find_group(&self, id: PaneId) -> Option<&TabGroup> {
        match self {
            Self::Leaf(group) => (group.id == id).then_some(group),
            Self::Split { children, .. } => children.iter().find_map(|c| c.find_group(id)),
        }
    }

    /// Mutable access to the group with the given id.
    pub fn find_group_mut(&mut self, id: PaneId) -> Option<&mut TabGroup> {
        match self {
            Self::Leaf(group) => (group.id == id).then_some(group),
            Self::Split { children, .. } => {
                children.iter_mut().find_map(|c| c.find_group_mut(id))
            }
        }
    }

    /// The pane holding `view` as a tab.
    pub fn group_of_view(&self, view: ViewId) -> Option<PaneId> {
        self.groups()
            .into_iter()
            .find(|g| g.tabs.contains(&view))
            .map(|g| g.id)
    }

    /// Split the leaf `target` in `direction`, placing `new_group` after it.
    ///
    /// When the target already sits in a split of the same direction the new
    /// group joins that split instead of nesting. Returns whether the target
    /// was found.
    pub fn split_leaf(
        &mut self,
        target: PaneId,
        direction: SplitDirection,
        new_group: TabGroup,
    ) -> bool {
        match self {
            Self::Leaf(group) => {
                if group.id != target {
                    return false;
                }
                let old = std::mem::replace(self, Self::Leaf(TabGroup::new(target)));
                *self = Self::Split {
                    direction,
                    children: vec![old, Self::Leaf(new_group)],
                };
                true
            }
            Self::Split {
                direction: own,
                children,
            } => {
                if *own == direction
                    && let Some(index) = children
                        .iter()
                        .position(|c| matches!(c, Self::Leaf(g) if g.id == target))
                {
                    children.insert(index + 1, Self::Leaf(new_group));
                    return true;
                }
                for child in children.iter_mut() {
                    if child.split_leaf(target, direction, new_group.clone()) {
                        return true;
                    }
                }
                false
            }
        }
    }

    /// Remove the group `target`, collapsing any split left with one child.
    ///
    /// Removing the last remaining group is refused (the layout always shows
    /// at least one pane). Returns the removed group.
    pub fn remove_group(&mut self, target: PaneId) -> Option<TabGroup> {
        if matches!(self, Self::Leaf(_)) {
            return None;
        }
        let removed = self.remove_group_inner(target)?;
        self.collapse();
        Some(removed)
    }

    fn remove_group_inner(&mut self, target: PaneId) -> Option<TabGroup> {
        let Self::Split { children, .. } = self else {
            return None;
        };
        if let Some(index) = children
            .iter()
            .position(|c| matches!(c, Self::Leaf(g) if g.id == target))
        {
            let Self::Leaf(group) = children.remove(index) else {
                return None;
            };
            return Some(group);
        }
        children
            .iter_mut()
            .find_map(|c| c.remove_group_inner(target))
    }

    /// Flatten single-child splits bottom-up.
    fn collapse(&mut self) {
        if let Self::Split { children, .. } = self {
            for child in children.iter_mut() {
                child.collapse();
            }
            if children.len() == 1 {
                *self = children.remove(0);
            }
        }
    }

    /// Number of tab groups in the tree.
    pub fn group_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Split { children, .. } => children.iter().map(PaneNode::group_count).sum(),
        }
    }
}
