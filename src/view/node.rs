use serde::Serialize;

use crate::model::plan::Plan;
use crate::model::project::Project;
use crate::model::task::{Task, TaskResult};

/// Handle to a node. A slot's generation moves on whenever its node is
/// released, so ids of deleted nodes (and ids from before a rebuild) never
/// resolve again, even after the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    slot: u32,
    generation: u32,
}

/// What a node wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The project's plan collection (the invisible root)
    Plans,
    Plan,
    Task,
}

/// Nodes do not own document data: a node is resolved against the project
/// by position, so positions must always match document indices.
#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    position: usize,
    children: Vec<NodeId>,
}

/// Borrowed view of the document element behind a node
#[derive(Debug, Clone, Copy)]
pub enum Element<'a> {
    Plans(&'a Project),
    Plan(&'a Plan),
    Task { plan: &'a Plan, task: &'a Task },
}

impl<'a> Element<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Element::Plans(_) => NodeKind::Plans,
            Element::Plan(_) => NodeKind::Plan,
            Element::Task { .. } => NodeKind::Task,
        }
    }

    pub fn text(&self) -> &'a str {
        match self {
            Element::Plans(_) => "Plans",
            Element::Plan(plan) => &plan.ancestor,
            Element::Task { task, .. } => &task.source,
        }
    }

    pub fn description(&self) -> &'a str {
        match self {
            Element::Plans(_) => "",
            Element::Plan(plan) => &plan.goal,
            Element::Task { task, .. } => &task.description,
        }
    }

    pub fn result(&self) -> Option<&'a TaskResult> {
        match self {
            Element::Task { task, .. } => task.result.as_ref(),
            _ => None,
        }
    }

    /// The owning plan's ancestor; empty for anything but tasks
    pub fn ancestor(&self) -> &'a str {
        match self {
            Element::Task { plan, .. } => &plan.ancestor,
            _ => "",
        }
    }

    pub fn link(&self) -> &'a str {
        match self {
            Element::Plans(_) => "",
            Element::Plan(plan) => &plan.ancestor_link,
            Element::Task { task, .. } => &task.source_link,
        }
    }

    /// Tasks are complete once they have a result; collections once every
    /// child is complete. An empty collection is not complete.
    pub fn is_complete(&self) -> bool {
        match self {
            Element::Plans(project) => {
                !project.plans.is_empty() && project.plans.iter().all(Plan::is_complete)
            }
            Element::Plan(plan) => plan.is_complete(),
            Element::Task { task, .. } => !task.is_open(),
        }
    }
}

/// Mutable view of the document element behind a node
#[derive(Debug)]
pub enum ElementMut<'a> {
    Plans,
    Plan(&'a mut Plan),
    Task(&'a mut Task),
}

impl ElementMut<'_> {
    pub fn set_text(&mut self, value: String) {
        match self {
            ElementMut::Plans => {}
            ElementMut::Plan(plan) => plan.ancestor = value,
            ElementMut::Task(task) => task.source = value,
        }
    }

    pub fn set_description(&mut self, value: String) {
        match self {
            ElementMut::Plans => {}
            ElementMut::Plan(plan) => plan.goal = value,
            ElementMut::Task(task) => task.description = value,
        }
    }

    /// Replace (or clear) a task's result; no-op for other elements
    pub fn set_result(&mut self, value: Option<TaskResult>) {
        if let ElementMut::Task(task) = self {
            task.result = value;
        }
    }

    pub fn set_link(&mut self, value: String) {
        match self {
            ElementMut::Plans => {}
            ElementMut::Plan(plan) => plan.ancestor_link = value,
            ElementMut::Task(task) => task.source_link = value,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of tree nodes wrapping a project's plans and tasks.
///
/// Ownership flows parent → children; the parent link is a plain id.
/// Released slots go on a free list and are reused by later allocations.
#[derive(Debug, Default)]
pub struct NodeTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: Option<NodeId>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree for `project`, discarding every existing node
    pub fn build(project: Option<&Project>) -> Self {
        let mut tree = NodeTree::new();
        tree.rebuild(project);
        tree
    }

    /// Drop all nodes and wrap `project` afresh. Old ids become stale.
    pub fn rebuild(&mut self, project: Option<&Project>) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
        self.root = None;

        let Some(project) = project else {
            return;
        };
        let root = self.alloc(NodeKind::Plans, None, 0);
        self.root = Some(root);
        for (plan_pos, plan) in project.plans.iter().enumerate() {
            let plan_id = self.alloc(NodeKind::Plan, Some(root), plan_pos);
            self.push_child(root, plan_id);
            for task_pos in 0..plan.tasks.len() {
                let task_id = self.alloc(NodeKind::Task, Some(plan_id), task_pos);
                self.push_child(plan_id, task_id);
            }
        }
        tracing::debug!(
            nodes = self.slots.len() - self.free.len(),
            slots = self.slots.len(),
            "node tree rebuilt"
        );
    }

    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>, position: usize) -> NodeId {
        let node = Node {
            kind,
            parent,
            position,
            children: Vec::new(),
        };
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let entry = &mut self.slots[slot as usize];
        entry.node = Some(node);
        NodeId {
            slot,
            generation: entry.generation,
        }
    }

    fn push_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.slot as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.slot as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    /// The plan collection node, if a project is loaded
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(|n| n.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.node(id).map(|n| n.position)
    }

    /// Child ids in display order; empty for tasks and unknown ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn child(&self, id: NodeId, row: usize) -> Option<NodeId> {
        self.children(id).get(row).copied()
    }

    /// Resolve a node against the project it was built from
    pub fn element<'p>(&self, project: &'p Project, id: NodeId) -> Option<Element<'p>> {
        let node = self.node(id)?;
        match node.kind {
            NodeKind::Plans => Some(Element::Plans(project)),
            NodeKind::Plan => project.plans.get(node.position).map(Element::Plan),
            NodeKind::Task => {
                let plan_pos = self.position(node.parent?)?;
                let plan = project.plans.get(plan_pos)?;
                let task = plan.tasks.get(node.position)?;
                Some(Element::Task { plan, task })
            }
        }
    }

    pub fn element_mut<'p>(&self, project: &'p mut Project, id: NodeId) -> Option<ElementMut<'p>> {
        let node = self.node(id)?;
        match node.kind {
            NodeKind::Plans => Some(ElementMut::Plans),
            NodeKind::Plan => project.plans.get_mut(node.position).map(ElementMut::Plan),
            NodeKind::Task => {
                let plan_pos = self.position(node.parent?)?;
                let task = project
                    .plans
                    .get_mut(plan_pos)?
                    .tasks
                    .get_mut(node.position)?;
                Some(ElementMut::Task(task))
            }
        }
    }

    /// Append a new plan (under the root) or task (under a plan) to the
    /// document and wrap it in a new node. Tasks cannot have children.
    pub fn create_child(&mut self, project: &mut Project, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        let child_kind = match node.kind {
            NodeKind::Plans => {
                project.add_plan();
                NodeKind::Plan
            }
            NodeKind::Plan => {
                project.plans.get_mut(node.position)?.add_task();
                NodeKind::Task
            }
            NodeKind::Task => return None,
        };
        let position = node.children.len();
        let child = self.alloc(child_kind, Some(id), position);
        self.push_child(id, child);
        Some(child)
    }

    /// Remove child `index` of `id` from the document and from the tree,
    /// renumbering the siblings after it. Out-of-range indices do nothing.
    pub fn delete_child(&mut self, project: &mut Project, id: NodeId, index: usize) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if index >= node.children.len() {
            return false;
        }
        match node.kind {
            NodeKind::Plans => project.delete_plan(index),
            NodeKind::Plan => match project.plans.get_mut(node.position) {
                Some(plan) => plan.delete_task(index),
                None => return false,
            },
            NodeKind::Task => return false,
        }

        let (removed, trailing) = match self.node_mut(id) {
            Some(node) => {
                let removed = node.children.remove(index);
                (removed, node.children[index..].to_vec())
            }
            None => return false,
        };
        for (offset, sibling) in trailing.into_iter().enumerate() {
            if let Some(sibling) = self.node_mut(sibling) {
                sibling.position = index + offset;
            }
        }
        self.release(removed);
        true
    }

    /// Free a node and its whole subtree
    fn release(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.release(child);
        }
        if !self.contains(id) {
            return;
        }
        let slot = &mut self.slots[id.slot as usize];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.slot);
    }

    /// Number of slots allocated, live or free
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_complete(&self, project: &Project, id: NodeId) -> bool {
        self.element(project, id).is_some_and(|e| e.is_complete())
    }
}
