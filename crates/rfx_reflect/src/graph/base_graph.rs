#![expect(unsafe_code, reason = "Cast resolution composes erased pointer adjusters.")]

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::ptr::NonNull;

use rfx_ptr::{Ptr, PtrMut};

use crate::collections::{HashMap, HashSet, new_map, new_set};
use crate::graph::{BaseEdge, HasBases};
use crate::ident::{Describe, TypeIdent, ident_of};

// -----------------------------------------------------------------------------
// BaseGraph

/// The adjacency table of registered base edges, and the upcast engine
/// over it.
///
/// Each registered type contributes its *direct* bases only; the full
/// ancestor set is resolved transitively by consulting each base's own
/// edge list, which registration pulls in recursively. The graph may be a
/// DAG — shared ancestors are collapsed by a visited set, never visited
/// twice.
///
/// Cast resolution is breadth-first in registration order, making it
/// deterministic: every resolution of the same (from, to) pair composes
/// the same adjusters and yields the same pointer.
///
/// # Examples
///
/// ```
/// use rfx_reflect::{BaseGraph, reflect_bases, impl_describe};
///
/// struct Animal { name: &'static str }
/// struct Dog { animal: Animal, good: bool }
///
/// impl_describe!(Animal => "demo::Animal", class);
/// impl_describe!(Dog => "demo::Dog", class);
/// reflect_bases!(Animal);
/// reflect_bases!(Dog: Animal => animal);
///
/// let mut graph = BaseGraph::new();
/// graph.register::<Dog>();
///
/// let dog = Dog { animal: Animal { name: "rex" }, good: true };
/// let animal: &Animal = graph.cast_ref(&dog).unwrap();
/// assert_eq!(animal.name, "rex");
/// ```
pub struct BaseGraph {
    edges: HashMap<TypeIdent, Vec<BaseEdge>>,
}

impl BaseGraph {
    /// Creates an empty graph.
    #[inline]
    pub const fn new() -> Self {
        Self { edges: new_map() }
    }

    /// Registers `D`'s direct base edges, pulling in every ancestor's own
    /// edge list recursively.
    ///
    /// Registration is idempotent: a type already present keeps its
    /// first-registered edges.
    pub fn register<D: HasBases>(&mut self) {
        let ident = ident_of::<D>();
        if self.edges.contains_key(&ident) {
            return;
        }
        let mut direct = Vec::new();
        <D::Bases as crate::graph::BaseList<D>>::append_direct(&mut direct);
        self.edges.insert(ident, direct);
        <D::Bases as crate::graph::BaseList<D>>::register_ancestors(self);
    }

    /// Whether the type has declared its base list (even an empty one).
    #[inline]
    pub fn is_registered(&self, ident: TypeIdent) -> bool {
        self.edges.contains_key(&ident)
    }

    /// The direct base edges of a type, in declaration order.
    pub fn direct_bases(&self, ident: TypeIdent) -> &[BaseEdge] {
        self.edges.get(&ident).map_or(&[], Vec::as_slice)
    }

    /// The transitive ancestor set, breadth-first, each ancestor exactly
    /// once. Does not include the type itself.
    pub fn ancestors(&self, ident: TypeIdent) -> Vec<TypeIdent> {
        let mut visited: HashSet<TypeIdent> = new_set();
        visited.insert(ident);
        let mut order = Vec::new();
        let mut queue: VecDeque<TypeIdent> = VecDeque::new();
        queue.push_back(ident);
        while let Some(at) = queue.pop_front() {
            for edge in self.direct_bases(at) {
                if visited.insert(edge.base()) {
                    order.push(edge.base());
                    queue.push_back(edge.base());
                }
            }
        }
        order
    }

    /// The transitive ancestors grouped by distance: direct bases first,
    /// then their bases, and so on. Within a level, declaration order.
    ///
    /// A shared ancestor appears once, at its smallest distance.
    pub fn ancestor_levels(&self, ident: TypeIdent) -> Vec<Vec<TypeIdent>> {
        let mut visited: HashSet<TypeIdent> = new_set();
        visited.insert(ident);
        let mut levels: Vec<Vec<TypeIdent>> = Vec::new();
        let mut frontier = alloc::vec![ident];
        loop {
            let mut next = Vec::new();
            for &at in &frontier {
                for edge in self.direct_bases(at) {
                    if visited.insert(edge.base()) {
                        next.push(edge.base());
                    }
                }
            }
            if next.is_empty() {
                return levels;
            }
            frontier.clone_from(&next);
            levels.push(next);
        }
    }

    /// Whether `to` is reachable from `from` along registered edges.
    ///
    /// A type reaches itself.
    pub fn has_path(&self, from: TypeIdent, to: TypeIdent) -> bool {
        from == to || self.ancestors(from).contains(&to)
    }

    /// The breadth-first path from `from` to `to`, endpoints included.
    ///
    /// The same path every call; `None` when `to` is not an ancestor.
    pub fn path(&self, from: TypeIdent, to: TypeIdent) -> Option<Vec<TypeIdent>> {
        if from == to {
            return Some(alloc::vec![from]);
        }
        let mut parent: HashMap<TypeIdent, TypeIdent> = new_map();
        let mut queue: VecDeque<TypeIdent> = VecDeque::new();
        queue.push_back(from);
        while let Some(at) = queue.pop_front() {
            for edge in self.direct_bases(at) {
                if edge.base() == from || parent.contains_key(&edge.base()) {
                    continue;
                }
                parent.insert(edge.base(), at);
                if edge.base() == to {
                    let mut path = alloc::vec![to];
                    let mut step = to;
                    while let Some(&prev) = parent.get(&step) {
                        path.push(prev);
                        step = prev;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(edge.base());
            }
        }
        None
    }

    /// Adjusts a pointer from its exact type `from` to an ancestor `to`.
    ///
    /// Returns `None` when no registered path exists; `from == to` is the
    /// identity. Only upcasts are served — resolving toward a descendant
    /// always fails, whatever the pointee really is.
    ///
    /// # Safety
    ///
    /// `ptr` must address a live value whose **exact** type is `from`. The
    /// engine does not inspect memory to verify this; a wrong `from` makes
    /// the composed adjusters read the wrong layout.
    pub unsafe fn try_cast<'a>(
        &self,
        ptr: Ptr<'a>,
        from: TypeIdent,
        to: TypeIdent,
    ) -> Option<Ptr<'a>> {
        if from == to {
            return Some(ptr);
        }
        let mut visited: HashSet<TypeIdent> = new_set();
        visited.insert(from);
        let mut queue: VecDeque<(TypeIdent, Ptr<'a>)> = VecDeque::new();
        queue.push_back((from, ptr));
        while let Some((at, here)) = queue.pop_front() {
            for edge in self.direct_bases(at) {
                if !visited.insert(edge.base()) {
                    continue;
                }
                // SAFETY: `here` was adjusted edge-by-edge from a pointer
                // whose exact type matched; each hop lands on the edge's
                // derived type.
                let adjusted = unsafe { edge.apply(here) };
                if edge.base() == to {
                    return Some(adjusted);
                }
                queue.push_back((edge.base(), adjusted));
            }
        }
        None
    }

    /// Mutable-pointer form of [`try_cast`](BaseGraph::try_cast).
    ///
    /// # Safety
    ///
    /// Same contract as [`try_cast`](BaseGraph::try_cast); exclusivity
    /// carries over from `ptr` to the result.
    pub unsafe fn try_cast_mut<'a>(
        &self,
        ptr: PtrMut<'a>,
        from: TypeIdent,
        to: TypeIdent,
    ) -> Option<PtrMut<'a>> {
        // SAFETY: forwarded contract; the shared walk never writes.
        let cast = unsafe { self.try_cast(ptr.as_const(), from, to) }?;
        // SAFETY: `ptr` granted exclusive access to the whole object, the
        // result addresses a subobject of it.
        Some(unsafe { PtrMut::new(NonNull::from(cast)) })
    }

    /// Safe upcast of a reference along registered edges.
    pub fn cast_ref<'a, Src: Describe, Dst: Describe>(&self, value: &'a Src) -> Option<&'a Dst> {
        let ptr = Ptr::from_ref(value);
        // SAFETY: `ptr` addresses a live `Src`, and `from` is its exact type.
        let cast = unsafe { self.try_cast(ptr, ident_of::<Src>(), ident_of::<Dst>()) }?;
        // SAFETY: the engine only follows registered adjusters, which
        // produce valid `Dst` pointers.
        Some(unsafe { cast.as_ref::<Dst>() })
    }

    /// Safe mutable upcast of a reference along registered edges.
    pub fn cast_mut<'a, Src: Describe, Dst: Describe>(
        &self,
        value: &'a mut Src,
    ) -> Option<&'a mut Dst> {
        let ptr = PtrMut::from_mut(value);
        // SAFETY: `ptr` addresses a live `Src` exclusively, and `from` is
        // its exact type.
        let cast = unsafe { self.try_cast_mut(ptr, ident_of::<Src>(), ident_of::<Dst>()) }?;
        // SAFETY: as in `cast_ref`, plus exclusivity from `value`.
        Some(unsafe { cast.as_mut::<Dst>() })
    }
}

impl Default for BaseGraph {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::BaseGraph;
    use crate::ident::ident_of;
    use crate::{impl_describe, reflect_bases};

    struct Top {
        tag: i32,
    }
    struct Left {
        top: Top,
        l: i32,
    }
    struct Right {
        top: Top,
        r: i32,
    }
    struct Bottom {
        left: Left,
        right: Right,
    }
    struct Stranger {
        s: i32,
    }

    impl_describe!(Top => "graph_tests::Top", class);
    impl_describe!(Left => "graph_tests::Left", class);
    impl_describe!(Right => "graph_tests::Right", class);
    impl_describe!(Bottom => "graph_tests::Bottom", class);
    impl_describe!(Stranger => "graph_tests::Stranger", class);

    reflect_bases!(Top);
    reflect_bases!(Left: Top => top);
    reflect_bases!(Right: Top => top);
    // The shared ancestor is listed as a direct base of the most-derived
    // type; breadth-first resolution always collapses onto that edge.
    reflect_bases!(Bottom: Left => left, Right => right, Top => left.top);
    reflect_bases!(Stranger);

    fn diamond() -> BaseGraph {
        let mut graph = BaseGraph::new();
        graph.register::<Bottom>();
        graph
    }

    fn sample() -> Bottom {
        Bottom {
            left: Left {
                top: Top { tag: 1 },
                l: 2,
            },
            right: Right {
                top: Top { tag: 3 },
                r: 4,
            },
        }
    }

    #[test]
    fn registration_pulls_in_ancestors() {
        let graph = diamond();
        assert!(graph.is_registered(ident_of::<Bottom>()));
        assert!(graph.is_registered(ident_of::<Left>()));
        assert!(graph.is_registered(ident_of::<Top>()));
    }

    #[test]
    fn ancestors_are_deduplicated() {
        let graph = diamond();
        let ancestors = graph.ancestors(ident_of::<Bottom>());
        assert_eq!(
            ancestors,
            [ident_of::<Left>(), ident_of::<Right>(), ident_of::<Top>()]
        );
    }

    #[test]
    fn ancestor_levels_group_by_distance() {
        let graph = diamond();
        assert_eq!(
            graph.ancestor_levels(ident_of::<Bottom>()),
            [[ident_of::<Left>(), ident_of::<Right>(), ident_of::<Top>()]]
        );
        assert_eq!(
            graph.ancestor_levels(ident_of::<Left>()),
            [[ident_of::<Top>()]]
        );
        assert!(graph.ancestor_levels(ident_of::<Top>()).is_empty());
    }

    #[test]
    fn diamond_resolves_to_one_ancestor_pointer() {
        let graph = diamond();
        let bottom = sample();

        let first: &Top = graph.cast_ref(&bottom).unwrap();
        let second: &Top = graph.cast_ref(&bottom).unwrap();
        assert!(core::ptr::eq(first, second));
        // The collapsed ancestor is the one the direct edge designates.
        assert!(core::ptr::eq(first, &bottom.left.top));
        assert_eq!(first.tag, 1);
    }

    #[test]
    fn upcast_through_intermediate() {
        let graph = diamond();
        let bottom = sample();

        let left: &Left = graph.cast_ref(&bottom).unwrap();
        assert_eq!(left.l, 2);
        let top: &Top = graph.cast_ref(left).unwrap();
        assert!(core::ptr::eq(top, &bottom.left.top));
    }

    #[test]
    fn identity_cast_is_a_no_op() {
        let graph = diamond();
        let bottom = sample();
        let same: &Bottom = graph.cast_ref(&bottom).unwrap();
        assert!(core::ptr::eq(same, &bottom));
    }

    #[test]
    fn unrelated_types_do_not_cast() {
        let mut graph = diamond();
        graph.register::<Stranger>();
        let stranger = Stranger { s: 9 };
        assert!(graph.cast_ref::<Stranger, Top>(&stranger).is_none());
    }

    #[test]
    fn downcasts_are_not_served() {
        let graph = diamond();
        let bottom = sample();
        let top: &Top = graph.cast_ref(&bottom).unwrap();
        assert!(graph.cast_ref::<Top, Bottom>(top).is_none());
        assert!(!graph.has_path(ident_of::<Top>(), ident_of::<Bottom>()));
        assert!(graph.has_path(ident_of::<Bottom>(), ident_of::<Top>()));
    }

    #[test]
    fn mutable_upcast_shares_the_same_address() {
        let graph = diamond();
        let mut bottom = sample();
        let expected = core::ptr::from_ref(&bottom.right) as usize;
        let right: &mut Right = graph.cast_mut(&mut bottom).unwrap();
        right.r += 1;
        assert_eq!(core::ptr::from_mut(right) as usize, expected);
        assert_eq!(bottom.right.r, 5);
    }
}
