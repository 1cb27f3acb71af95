//! Dense index arenas for nodes, views and injectors.
//!
//! Freed slots are recycled. Ids carry the generation of the slot they were
//! allocated in, so an id that outlived its entry never resolves to the
//! entry that reused the slot.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

pub trait ArenaId: Copy {
    fn from_parts(index: usize, generation: u32) -> Self;
    fn index(self) -> usize;
    fn generation(self) -> u32;
}

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32, u32);

        impl $crate::render3::arena::ArenaId for $name {
            fn from_parts(index: usize, generation: u32) -> Self {
                $name(index as u32, generation)
            }

            fn index(self) -> usize {
                self.0 as usize
            }

            fn generation(self) -> u32 {
                self.1
            }
        }
    };
}

pub(crate) use arena_id;

#[derive(Debug)]
struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug)]
pub struct Arena<I, T> {
    entries: Vec<Entry<T>>,
    free: Vec<usize>,
    _id: PhantomData<I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            _id: PhantomData,
        }
    }

    pub fn alloc(&mut self, value: T) -> I {
        match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index];
                entry.generation = entry.generation.wrapping_add(1);
                entry.value = Some(value);
                I::from_parts(index, entry.generation)
            }
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    value: Some(value),
                });
                I::from_parts(self.entries.len() - 1, 0)
            }
        }
    }

    fn entry(&self, id: I) -> Option<&Entry<T>> {
        self.entries
            .get(id.index())
            .filter(|entry| entry.generation == id.generation())
    }

    fn entry_mut(&mut self, id: I) -> Option<&mut Entry<T>> {
        self.entries
            .get_mut(id.index())
            .filter(|entry| entry.generation == id.generation())
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.entry(id).and_then(|entry| entry.value.as_ref())
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.entry_mut(id).and_then(|entry| entry.value.as_mut())
    }

    pub fn remove(&mut self, id: I) -> Option<T> {
        let taken = self.entry_mut(id).and_then(|entry| entry.value.take());
        if taken.is_some() {
            self.free.push(id.index());
        }
        taken
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("stale arena id {}", id.index()),
        }
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("stale arena id {}", id.index()),
        }
    }
}
