//! Call tree derivation.

use dcc_protocol::MonitorTask;
use std::collections::HashMap;

/// A task together with the tasks started inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskNode {
    pub task: MonitorTask,
    pub children: Vec<TaskNode>,
}

impl TaskNode {
    /// Number of tasks in this subtree, including this one.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TaskNode::size).sum::<usize>()
    }

    /// Visit every node depth-first, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TaskNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Build the forest described by the tasks' parent links.
///
/// A task whose `parent_id` names another task in `tasks` becomes that
/// task's child; every other task is a root. Registry order is kept among
/// roots and among siblings. Tasks caught in a parent cycle, which only
/// malformed historical data can produce, are promoted to roots.
pub fn build_tree(tasks: &[MonitorTask]) -> Vec<TaskNode> {
    let positions: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.as_str(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (i, task) in tasks.iter().enumerate() {
        match task
            .parent_id
            .as_deref()
            .and_then(|p| positions.get(p).copied())
        {
            Some(parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut placed = vec![false; tasks.len()];
    let mut forest: Vec<TaskNode> = roots
        .iter()
        .map(|&i| assemble(i, tasks, &children, &mut placed))
        .collect();

    for i in 0..tasks.len() {
        if !placed[i] {
            forest.push(assemble(i, tasks, &children, &mut placed));
        }
    }
    forest
}

fn assemble(
    i: usize,
    tasks: &[MonitorTask],
    children: &[Vec<usize>],
    placed: &mut [bool],
) -> TaskNode {
    placed[i] = true;
    let mut node = TaskNode {
        task: tasks[i].clone(),
        children: Vec::new(),
    };
    for &child in &children[i] {
        if !placed[child] {
            node.children.push(assemble(child, tasks, children, placed));
        }
    }
    node
}
