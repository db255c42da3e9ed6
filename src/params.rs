//! Parameters captured from wildcard segments during a lookup.

use std::vec::{self, Vec};

use xitca_unsafe_collection::bound_queue::stack::{self, StackQueue};

use super::SmallStr;

const INLINE: usize = 2;

/// A single URL parameter, consisting of a key and a value.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
struct Param<'p> {
    key: SmallStr,
    value: &'p str,
}

impl<'p> Param<'p> {
    fn key_str(&self) -> &str {
        self.key.as_ref()
    }

    fn value_str(&self) -> &'p str {
        self.value
    }
}

/// The wildcard parameters of a matched route, in declaration order.
///
/// Keys are owned small strings copied from the routing tree so the list
/// only borrows from the request path. Up to two parameters are stored
/// inline; routes with more spill to the heap, pre-sized from the matched
/// subtree's wildcard bound.
#[derive(Debug)]
pub struct Params<'p> {
    kind: ParamsKind<'p>,
}

#[derive(Debug)]
enum ParamsKind<'p> {
    Inline(StackQueue<Param<'p>, INLINE>),
    Heap(Vec<Param<'p>>),
}

impl<'p> Params<'p> {
    pub(crate) const fn new() -> Self {
        Self {
            kind: ParamsKind::Inline(StackQueue::new()),
        }
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        match self.kind {
            ParamsKind::Inline(ref q) => q.len(),
            ParamsKind::Heap(ref vec) => vec.len(),
        }
    }

    /// Returns `true` if there are no parameters in the list.
    pub fn is_empty(&self) -> bool {
        match self.kind {
            ParamsKind::Inline(ref q) => q.is_empty(),
            ParamsKind::Heap(ref q) => q.is_empty(),
        }
    }

    /// Returns the value of the first parameter registered under the given key.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&'p str> {
        let key = key.as_ref();

        match self.kind {
            ParamsKind::Inline(ref q) => q.iter().find(|param| param.key_str() == key).map(Param::value_str),
            ParamsKind::Heap(ref q) => q.iter().find(|param| param.key_str() == key).map(Param::value_str),
        }
    }

    /// Iterates the parameters as key value pairs in declaration order.
    pub fn iter(&self) -> ParamsIter<'_, 'p> {
        let kind = match self.kind {
            ParamsKind::Inline(ref q) => ParamsIterKind::Inline(q.iter()),
            ParamsKind::Heap(ref q) => ParamsIterKind::Heap(q.iter()),
        };

        ParamsIter { kind }
    }

    /// Moves empty inline storage to the heap with room for `n` parameters.
    pub(crate) fn reserve(&mut self, n: usize) {
        if let ParamsKind::Inline(ref q) = self.kind {
            if q.is_empty() && n > INLINE {
                self.kind = ParamsKind::Heap(Vec::with_capacity(n));
            }
        }
    }

    /// Inserts a key value parameter pair into the list.
    pub(crate) fn push(&mut self, key: &str, value: &'p [u8]) {
        #[cold]
        #[inline(never)]
        fn drain_to_vec<T, const LEN: usize>(value: T, q: &mut StackQueue<T, LEN>) -> Vec<T> {
            // respect vector's exponential growth practice.
            let mut v = Vec::with_capacity(LEN * 2);
            while let Some(value) = q.pop_front() {
                v.push(value);
            }
            v.push(value);
            v
        }

        let param = Param {
            key: SmallStr::from(key),
            // wildcard spans always start and end on '/' boundaries of the
            // request path so re-slicing the original str cannot fail.
            value: std::str::from_utf8(value).unwrap(),
        };
        match self.kind {
            ParamsKind::Inline(ref mut q) => {
                if let Err(e) = q.push_back(param) {
                    self.kind = ParamsKind::Heap(drain_to_vec(e.into_inner(), q));
                }
            }
            ParamsKind::Heap(ref mut q) => q.push(param),
        }
    }
}

pub struct ParamsIter<'a, 'p> {
    kind: ParamsIterKind<'a, 'p>,
}

enum ParamsIterKind<'a, 'p> {
    Inline(stack::Iter<'a, Param<'p>, INLINE>),
    Heap(core::slice::Iter<'a, Param<'p>>),
}

impl<'a, 'p> Iterator for ParamsIter<'a, 'p> {
    type Item = (&'a str, &'p str);

    fn next(&mut self) -> Option<Self::Item> {
        match self.kind {
            ParamsIterKind::Inline(ref mut iter) => iter.next().map(|p| (p.key_str(), p.value)),
            ParamsIterKind::Heap(ref mut iter) => iter.next().map(|p| (p.key_str(), p.value)),
        }
    }
}

impl<'p> IntoIterator for Params<'p> {
    type Item = (SmallStr, &'p str);
    type IntoIter = ParamsIntoIter<'p>;

    fn into_iter(self) -> Self::IntoIter {
        let kind = match self.kind {
            ParamsKind::Inline(q) => ParamsIntoIterKind::Inline(q),
            ParamsKind::Heap(q) => ParamsIntoIterKind::Heap(q.into_iter()),
        };

        ParamsIntoIter { kind }
    }
}

pub struct ParamsIntoIter<'p> {
    kind: ParamsIntoIterKind<'p>,
}

enum ParamsIntoIterKind<'p> {
    Inline(StackQueue<Param<'p>, INLINE>),
    Heap(vec::IntoIter<Param<'p>>),
}

impl<'p> Iterator for ParamsIntoIter<'p> {
    type Item = (SmallStr, &'p str);

    fn next(&mut self) -> Option<Self::Item> {
        match self.kind {
            ParamsIntoIterKind::Inline(ref mut q) => q.pop_front().map(|p| (p.key, p.value)),
            ParamsIntoIterKind::Heap(ref mut iter) => iter.next().map(|p| (p.key, p.value)),
        }
    }
}
