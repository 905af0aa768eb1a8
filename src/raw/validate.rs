use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

use super::balance::Search;
use super::handle::Handle;
use super::node::Color;
use super::tree::RawTree;
use crate::comparator::Comparator;

impl<K, V> RawTree<K, V> {
    /// Checks every structural invariant and panics with the full list of violations.
    pub(crate) fn validate<C: Comparator<K>>(&self, comparator: &C) {
        let mut errors: Vec<String> = Vec::new();

        if let Some(root) = self.root {
            if self.parent(root).is_some() {
                errors.push(format!("root {} has a parent", root.to_index()));
            }
            if self.color(root) != Color::Black {
                errors.push(format!("root {} is red", root.to_index()));
            }
        }

        let mut reachable = 0;
        self.validate_subtree(self.root, None, &mut reachable, &mut errors);
        if reachable != self.len() {
            errors.push(format!("len mismatch: len={}, reachable={reachable}", self.len()));
        }

        let order = self.handles_in_order();
        if order.len() != self.len() {
            errors.push(format!("in-order walk visits {} of {} elements", order.len(), self.len()));
        }
        for pair in order.windows(2) {
            if comparator.compare(self.key(pair[0]), self.key(pair[1])) != Ordering::Less {
                errors.push(format!("slots {} and {} are out of order", pair[0].to_index(), pair[1].to_index()));
            }
        }

        let leftmost = self.root.map(|root| self.leftmost(root));
        let rightmost = self.root.map(|root| self.rightmost(root));
        if self.first != leftmost {
            errors.push(format!("first cache {:?} != leftmost {leftmost:?}", self.first));
        }
        if self.last != rightmost {
            errors.push(format!("last cache {:?} != rightmost {rightmost:?}", self.last));
        }

        for &handle in &order {
            if self.locate(comparator, self.key(handle)) != Search::Found(handle) {
                errors.push(format!("tree search misses slot {}", handle.to_index()));
            }
        }

        if self.overlay().is_some() {
            self.validate_hashed(comparator, &order, &mut errors);
        } else {
            self.validate_dense(&mut errors);
        }

        assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
    }

    /// Returns the black height of `node`, counting the absent leaves.
    fn validate_subtree(
        &self,
        node: Option<Handle>,
        parent: Option<Handle>,
        reachable: &mut usize,
        errors: &mut Vec<String>,
    ) -> usize {
        let Some(node) = node else { return 1 };
        *reachable += 1;
        if *reachable > self.slots.len() {
            errors.push(String::from("cycle in tree links"));
            return 0;
        }
        if self.slot(node).entry().is_none() {
            errors.push(format!("slot {} is linked but vacant", node.to_index()));
            return 0;
        }
        if self.parent(node) != parent {
            errors.push(format!("slot {} has a stale parent link", node.to_index()));
        }
        if self.color(node) == Color::Red && (self.is_red(self.left(node)) || self.is_red(self.right(node))) {
            errors.push(format!("red slot {} has a red child", node.to_index()));
        }
        let left = self.validate_subtree(self.left(node), Some(node), reachable, errors);
        let right = self.validate_subtree(self.right(node), Some(node), reachable, errors);
        if left != right {
            errors.push(format!("black height differs below slot {}: {left} vs {right}", node.to_index()));
        }
        left + usize::from(self.color(node) == Color::Black)
    }

    fn validate_dense(&self, errors: &mut Vec<String>) {
        if self.slots.len() != self.len() {
            errors.push(format!("dense store holds {} slots for {} elements", self.slots.len(), self.len()));
        }
        if self.capacity() < self.len() {
            errors.push(format!("capacity {} below len {}", self.capacity(), self.len()));
        }
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.entry().is_none() {
                errors.push(format!("dense slot {index} is vacant"));
            }
            if slot.next().is_some() {
                errors.push(format!("dense slot {index} has a chain link"));
            }
        }
    }

    fn validate_hashed<C: Comparator<K>>(&self, comparator: &C, order: &[Handle], errors: &mut Vec<String>) {
        let Some(overlay) = self.overlay() else { return };
        if self.slots.len() != self.capacity() {
            errors.push(format!("hashed store holds {} slots for capacity {}", self.slots.len(), self.capacity()));
        }
        let full = self.slots.iter().filter(|slot| slot.entry().is_some()).count();
        if full != self.len() {
            errors.push(format!("{full} full slots for len {}", self.len()));
        }
        if self.len() > overlay.config().load_limit(self.capacity()) {
            errors.push(format!("len {} exceeds the load limit", self.len()));
        }

        // Every chain starts at a full home bucket and holds only elements of that bucket.
        let mut chained = 0;
        for bucket in (0..overlay.hashable()).map(Handle::from_index) {
            let home = self.slot(bucket);
            if home.entry().is_none() {
                if home.next().is_some() {
                    errors.push(format!("vacant bucket {} has a chain", bucket.to_index()));
                }
                continue;
            }
            let mut cursor = Some(bucket);
            while let Some(member) = cursor {
                chained += 1;
                if chained > self.len() {
                    errors.push(String::from("cycle in hash chains"));
                    return;
                }
                if self.slot(member).entry().is_none() {
                    errors.push(format!("chain of bucket {} reaches vacant slot {}", bucket.to_index(), member.to_index()));
                    break;
                }
                if self.bucket_of(member) != bucket {
                    errors.push(format!("slot {} is chained from foreign bucket {}", member.to_index(), bucket.to_index()));
                }
                if member != bucket && !overlay.is_collision_slot(member) {
                    errors.push(format!("slot {} is chained but lies in the bucket region", member.to_index()));
                }
                if member.to_index() >= overlay.collision_head() && member != bucket {
                    errors.push(format!("slot {} lies past the collision head", member.to_index()));
                }
                cursor = self.slot(member).next();
            }
        }
        if chained != self.len() {
            errors.push(format!("hash chains reach {chained} of {} elements", self.len()));
        }

        let mut free = overlay.free();
        let mut steps = 0;
        while let Some(slot) = free {
            steps += 1;
            if steps > self.capacity() {
                errors.push(String::from("cycle in free list"));
                break;
            }
            if self.slot(slot).entry().is_some() {
                errors.push(format!("free slot {} is full", slot.to_index()));
            }
            if !overlay.is_collision_slot(slot) || slot.to_index() >= overlay.collision_head() {
                errors.push(format!("free slot {} lies outside the used collision region", slot.to_index()));
            }
            free = self.slot(slot).next();
        }

        for &handle in order {
            let hash = self.slot(handle).meta().hash();
            if self.find_hashed(comparator, hash, self.key(handle)) != Some(handle) {
                errors.push(format!("hash lookup misses slot {}", handle.to_index()));
            }
        }
    }
}
