//! Bloom-filter injectors.
//!
//! Each node that hosts directives owns a 128-bit filter of the directive
//! types registered on it plus the union of its ancestors' filters. A lookup
//! walks up the injector chain only while the cumulative filter says a
//! match is still possible. Bits are only ever set, so a hit means
//! "possibly present" and a miss means "definitely absent".

use crate::render3::interfaces::definition::DirectiveDef;
use crate::render3::interfaces::node::{InjectorId, NodeId};
use crate::render3::runtime::Runtime;

/// Number of bits in each filter.
pub const BLOOM_SIZE: usize = 128;

const BLOOM_WORDS: usize = BLOOM_SIZE / 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInjector {
    pub parent: Option<InjectorId>,
    pub node: NodeId,
    /// Types registered on this node.
    pub bloom: [u32; BLOOM_WORDS],
    /// Types registered on any ancestor.
    pub cumulative: [u32; BLOOM_WORDS],
}

impl NodeInjector {
    pub fn has_bit(&self, bloom_bit: usize) -> bool {
        bit_set(&self.bloom, bloom_bit)
    }

    pub fn ancestors_may_have_bit(&self, bloom_bit: usize) -> bool {
        bit_set(&self.cumulative, bloom_bit)
    }
}

fn bit_set(words: &[u32; BLOOM_WORDS], bloom_bit: usize) -> bool {
    let mask = 1u32 << (bloom_bit % 32);
    words[bloom_bit / 32] & mask == mask
}

/// Filter bit a directive type hashes to.
pub fn bloom_bit(def: &DirectiveDef) -> usize {
    def.element_id() % BLOOM_SIZE
}

impl Runtime {
    /// Returns the injector owned by `node`, creating it on first use.
    ///
    /// A node shares its parent's injector until a directive is registered
    /// on it.
    pub(crate) fn get_or_create_node_injector(&mut self, node: NodeId) -> InjectorId {
        let lnode = &self.nodes[node];
        let parent_injector = lnode.parent.and_then(|parent| self.nodes[parent].injector);
        if let Some(existing) = lnode.injector {
            if Some(existing) != parent_injector {
                return existing;
            }
        }

        let cumulative = match parent_injector {
            Some(parent) => {
                let parent = &self.injectors[parent];
                let mut words = [0u32; BLOOM_WORDS];
                for (i, word) in words.iter_mut().enumerate() {
                    *word = parent.cumulative[i] | parent.bloom[i];
                }
                words
            }
            None => [0; BLOOM_WORDS],
        };
        let injector = self.injectors.alloc(NodeInjector {
            parent: parent_injector,
            node,
            bloom: [0; BLOOM_WORDS],
            cumulative,
        });
        self.nodes[node].injector = Some(injector);
        injector
    }

    pub(crate) fn bloom_add(&mut self, injector: InjectorId, def: &DirectiveDef) {
        let bit = bloom_bit(def);
        self.injectors[injector].bloom[bit / 32] |= 1 << (bit % 32);
    }

    pub fn injector(&self, id: InjectorId) -> &NodeInjector {
        &self.injectors[id]
    }

    /// Injector visible from `node` (its own or the nearest ancestor's).
    pub fn node_injector(&self, node: NodeId) -> Option<InjectorId> {
        self.nodes[node].injector
    }

    /// Finds the closest injector, starting at `start`, whose own filter has
    /// `bloom_bit` set.
    ///
    /// Stops as soon as an injector's cumulative filter rules out every
    /// ancestor.
    pub fn bloom_find_possible_injector(&self, start: InjectorId, bloom_bit: usize) -> Option<InjectorId> {
        let mut current = Some(start);
        while let Some(id) = current {
            let injector = &self.injectors[id];
            if injector.has_bit(bloom_bit) {
                return Some(id);
            }
            current = if injector.ancestors_may_have_bit(bloom_bit) {
                injector.parent
            } else {
                None
            };
        }
        None
    }
}
