//! An [AVL tree](https://en.wikipedia.org/wiki/AVL_tree) keyed by a caller-supplied cost that
//! permits duplicate keys. It serves as the open set of the best-first search: items are inserted
//! with [insert](OrderedMultiTree::insert), which hands back a [NodeHandle] identifying that exact
//! entry, so a stale entry can later be removed with [delete](OrderedMultiTree::delete) even when
//! other entries share its cost.
//!
//! Nodes live in an arena of slots and link to each other by index. Subtree heights are cached
//! per node and updated on every structural change.
use crate::error::TreeError;
use core::fmt;
use std::marker::PhantomData;

/// Identity of an entry in an [OrderedMultiTree]. Handles are never reused: a slot freed by a
/// removal gets a new generation, so an old handle cannot alias a newer entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: usize,
    generation: u32,
}

#[derive(Clone, Debug)]
struct TreeNode<T> {
    item: T,
    left: Option<usize>,
    right: Option<usize>,
    height: u32,
}

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    node: Option<TreeNode<T>>,
}

/// Balanced ordered multiset over items of type `T`, ordered by the key `F` extracts.
///
/// Items with equal keys are kept in insertion order: ties are placed in the right subtree.
#[derive(Clone)]
pub struct OrderedMultiTree<T, K, F>
where
    F: Fn(&T) -> K,
{
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    root: Option<usize>,
    len: usize,
    key: F,
    _key: PhantomData<fn() -> K>,
}

impl<T, K, F> OrderedMultiTree<T, K, F>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    pub fn new(key: F) -> Self {
        OrderedMultiTree {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
            key,
            _key: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree, 0 when empty.
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    /// Inserts an item and returns the handle identifying it.
    pub fn insert(&mut self, item: T) -> NodeHandle {
        let handle = self.allocate(item);
        self.root = Some(self.insert_at(self.root, handle.index));
        self.len += 1;
        handle
    }

    /// Removes and returns the item with the smallest key. Among equal keys the one inserted
    /// first is returned.
    pub fn pop_min(&mut self) -> Result<T, TreeError> {
        let root = self.root.ok_or(TreeError::EmptyTree)?;
        let (rest, min) = self.detach_min(root);
        self.root = rest;
        self.len -= 1;
        Ok(self.release(min))
    }

    /// Removes the exact entry `handle` refers to.
    ///
    /// Descends by key; when keys tie, both subtrees are searched for the entry so that another
    /// entry with the same cost is never removed in its place. Fails with
    /// [TreeError::NodeNotFound] without modifying the tree if the entry is not present.
    pub fn delete(&mut self, handle: NodeHandle) -> Result<T, TreeError> {
        if !self.is_live(handle) {
            return Err(TreeError::NodeNotFound);
        }
        self.root = self.delete_at(self.root, handle.index)?;
        self.len -= 1;
        Ok(self.release(handle.index))
    }

    /// Whether the entry is reachable from the root.
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.is_live(handle) && self.subtree_contains(self.root, handle.index)
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        if self.is_live(handle) {
            Some(&self.node(handle.index).item)
        } else {
            None
        }
    }

    /// The item [pop_min](Self::pop_min) would return.
    pub fn peek_min(&self) -> Option<&T> {
        let mut current = self.root?;
        while let Some(left) = self.node(current).left {
            current = left;
        }
        Some(&self.node(current).item)
    }

    /// In-order traversal, i.e. by non-decreasing key.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            slots: &self.slots,
            stack: Vec::with_capacity(self.height() as usize),
        };
        iter.push_left_spine(self.root);
        iter
    }

    fn is_live(&self, handle: NodeHandle) -> bool {
        self.slots
            .get(handle.index)
            .is_some_and(|slot| slot.generation == handle.generation && slot.node.is_some())
    }

    fn allocate(&mut self, item: T) -> NodeHandle {
        let node = TreeNode {
            item,
            left: None,
            right: None,
            height: 1,
        };
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                NodeHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeHandle {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    fn release(&mut self, index: usize) -> T {
        let slot = &mut self.slots[index];
        let node = slot.node.take().expect("released a vacant slot");
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        node.item
    }

    fn node(&self, index: usize) -> &TreeNode<T> {
        self.slots[index]
            .node
            .as_ref()
            .expect("tree link points to a vacant slot")
    }

    fn node_mut(&mut self, index: usize) -> &mut TreeNode<T> {
        self.slots[index]
            .node
            .as_mut()
            .expect("tree link points to a vacant slot")
    }

    fn key_of(&self, index: usize) -> K {
        (self.key)(&self.node(index).item)
    }

    fn height_of(&self, link: Option<usize>) -> u32 {
        link.map_or(0, |index| self.node(index).height)
    }

    fn update_height(&mut self, index: usize) {
        let node = self.node(index);
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.node_mut(index).height = height;
    }

    /// height(left) - height(right)
    fn balance_factor(&self, index: usize) -> i64 {
        let node = self.node(index);
        self.height_of(node.left) as i64 - self.height_of(node.right) as i64
    }

    fn rotate_right(&mut self, parent: usize) -> usize {
        let pivot = self
            .node(parent)
            .left
            .expect("right rotation without a left child");
        let inner = self.node(pivot).right;
        self.node_mut(parent).left = inner;
        self.node_mut(pivot).right = Some(parent);
        self.update_height(parent);
        self.update_height(pivot);
        pivot
    }

    fn rotate_left(&mut self, parent: usize) -> usize {
        let pivot = self
            .node(parent)
            .right
            .expect("left rotation without a right child");
        let inner = self.node(pivot).left;
        self.node_mut(parent).right = inner;
        self.node_mut(pivot).left = Some(parent);
        self.update_height(parent);
        self.update_height(pivot);
        pivot
    }

    /// Refreshes the height of `index` and restores the balance invariant at it, returning the
    /// root of the (possibly rotated) subtree.
    fn rebalance(&mut self, index: usize) -> usize {
        self.update_height(index);
        let factor = self.balance_factor(index);
        if factor > 1 {
            let left = self.node(index).left.expect("left-heavy node without left child");
            // LR case, otherwise LL
            if self.balance_factor(left) < 0 {
                let left = self.rotate_left(left);
                self.node_mut(index).left = Some(left);
            }
            self.rotate_right(index)
        } else if factor < -1 {
            let right = self
                .node(index)
                .right
                .expect("right-heavy node without right child");
            // RL case, otherwise RR
            if self.balance_factor(right) > 0 {
                let right = self.rotate_right(right);
                self.node_mut(index).right = Some(right);
            }
            self.rotate_left(index)
        } else {
            index
        }
    }

    fn insert_at(&mut self, current: Option<usize>, new: usize) -> usize {
        let Some(current) = current else {
            return new;
        };
        if self.key_of(new) < self.key_of(current) {
            let left = self.insert_at(self.node(current).left, new);
            self.node_mut(current).left = Some(left);
        } else {
            let right = self.insert_at(self.node(current).right, new);
            self.node_mut(current).right = Some(right);
        }
        self.rebalance(current)
    }

    /// Unlinks the leftmost node below `index`. Returns the rebalanced remainder of the subtree
    /// and the detached node.
    fn detach_min(&mut self, index: usize) -> (Option<usize>, usize) {
        match self.node(index).left {
            None => (self.node(index).right, index),
            Some(left) => {
                let (rest, min) = self.detach_min(left);
                self.node_mut(index).left = rest;
                (Some(self.rebalance(index)), min)
            }
        }
    }

    fn delete_at(
        &mut self,
        current: Option<usize>,
        target: usize,
    ) -> Result<Option<usize>, TreeError> {
        let current = current.ok_or(TreeError::NodeNotFound)?;
        let (left, right) = {
            let node = self.node(current);
            (node.left, node.right)
        };
        if current == target {
            return Ok(match right {
                None => left,
                Some(right) => {
                    // Promote the in-order successor.
                    let (rest, successor) = self.detach_min(right);
                    let node = self.node_mut(successor);
                    node.left = left;
                    node.right = rest;
                    Some(self.rebalance(successor))
                }
            });
        }

        let target_key = self.key_of(target);
        let current_key = self.key_of(current);
        let go_left = if target_key < current_key {
            true
        } else if target_key > current_key {
            false
        } else if self.subtree_contains(right, target) {
            false
        } else if self.subtree_contains(left, target) {
            true
        } else {
            return Err(TreeError::NodeNotFound);
        };

        if go_left {
            let left = self.delete_at(left, target)?;
            self.node_mut(current).left = left;
        } else {
            let right = self.delete_at(right, target)?;
            self.node_mut(current).right = right;
        }
        Ok(Some(self.rebalance(current)))
    }

    /// Identity search below `link`, pruned by key where the ordering allows it.
    fn subtree_contains(&self, link: Option<usize>, target: usize) -> bool {
        let Some(index) = link else {
            return false;
        };
        if index == target {
            return true;
        }
        let node = self.node(index);
        let target_key = self.key_of(target);
        let key = self.key_of(index);
        if target_key < key {
            self.subtree_contains(node.left, target)
        } else if target_key > key {
            self.subtree_contains(node.right, target)
        } else {
            self.subtree_contains(node.right, target) || self.subtree_contains(node.left, target)
        }
    }
}

impl<T, K, F> fmt::Debug for OrderedMultiTree<T, K, F>
where
    T: fmt::Debug,
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OrderedMultiTree")
            .field("len", &self.len)
            .field("height", &self.height())
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// In-order iterator over an [OrderedMultiTree].
pub struct Iter<'a, T> {
    slots: &'a [Slot<T>],
    stack: Vec<usize>,
}

impl<'a, T> Iter<'a, T> {
    fn node(&self, index: usize) -> &'a TreeNode<T> {
        let slots: &'a [Slot<T>] = self.slots;
        slots[index]
            .node
            .as_ref()
            .expect("tree link points to a vacant slot")
    }

    fn push_left_spine(&mut self, mut link: Option<usize>) {
        while let Some(index) = link {
            self.stack.push(index);
            link = self.node(index).left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let index = self.stack.pop()?;
        let node = self.node(index);
        self.push_left_spine(node.right);
        Some(&node.item)
    }
}
