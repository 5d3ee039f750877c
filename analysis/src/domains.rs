use core::cmp::Ordering;
use core::fmt::{Debug, Display};
use core::hash::Hash;
use core::ops::{Add, Deref, DerefMut, Mul, Neg, Sub};
use std::collections::{HashMap, HashSet};

use fixedbitset::FixedBitSet;

/////////////////////////
// Traits for domains. //
/////////////////////////

/// A join semi-lattice is a partially ordered set where the least upper
/// bound exists for every subset. Usually, the ordering relation can be viewed
/// as "safe approximation". For example, the set {negative, zero} is a safe
/// approximation of {zero}. The goal of abstract interpretation is to calculate
/// a precise but safe approximation of the program behavior. In this library,
/// Top represents the biggest element (largest approximation), Bottom represents
/// the smallest one.
///
/// The solvers in this crate rely on nothing beyond this trait: `bottom`,
/// `join`, the `Eq` implementation, and the ordering. In particular there is
/// no widening hook; domains passed to the solvers are expected to have
/// finite height, and the solvers' iteration budget is the safety net when
/// they do not.
pub trait JoinSemiLattice: Eq + PartialOrd + Clone + Debug {
    /// A type to hold some information about the lattice on the side.
    ///
    /// For some lattices, like the power set lattice, we need to
    /// store somewhere the top or the bottom value. When we need
    /// no such values, set this to unit.
    type LatticeContext;

    /// The unit element of the join operation. Strictly speaking a join
    /// semi-lattice does not need to have a bottom element, but having one
    /// makes certain computations simpler. Bottom values in the analysis
    /// result often stand for dead code.
    ///
    /// Required to be the smallest element according to the ordering.
    fn bottom(ctx: &Self::LatticeContext) -> Self;

    /// Given two elements of the lattice the join operation will compute a
    /// precise and safe over approximation of its arguments. It computes
    /// the least upper bound. It is typically useful to calculate the
    /// analysis state after merge points where the program location after
    /// the branching needs to over approximate all predecessors.
    ///
    /// Requirements:
    /// * Reflexive: a.join(a, ctx) == a
    /// * Commutative: a.join(b, ctx) == b.join(a, ctx)
    /// * Bottom is unit: bottom.join(b, ctx) == b
    /// * Upper bound: a.join(b, ctx) >= a and a.join(b, ctx) >= b
    /// * Top is the largest: top.join(b, ctx) == top
    /// * Ordering is respected: a <= b => a.join(b, ctx) == b
    fn join(&self, other: &Self, ctx: &Self::LatticeContext) -> Self;
}

pub trait JoinSemiLatticeNoContext: JoinSemiLattice {
    /// See [JoinSemiLattice::bottom] for details. This version does not
    /// require a context.
    fn bottom_() -> Self;

    /// See [JoinSemiLattice::join] for details. This version does not
    /// require a context.
    fn join_(&self, other: &Self) -> Self;
}

impl<L: JoinSemiLattice<LatticeContext = ()>> JoinSemiLatticeNoContext for L {
    fn bottom_() -> Self {
        <L as JoinSemiLattice>::bottom(&())
    }

    fn join_(&self, other: &Self) -> Self {
        self.join(other, &())
    }
}

/// A lattice is a join semi-lattice that is also a meet semi-lattice, i.e.,
/// the greatest lower bound (meet) also exists for all subsets.
pub trait Lattice: JoinSemiLattice {
    /// The unit element of the meet operation, the largest element of the
    /// lattice.
    ///
    /// Requirements:
    /// Top is the greatest element of the lattice.
    fn top(ctx: &Self::LatticeContext) -> Self;

    /// Given two elements of the lattice the meet operation will compute the
    /// greatest lower bound. This is usually useful to exclude infeasible
    /// program states. Often used to implement the evaluation of conditions
    /// or assertions.
    ///
    /// * Reflexive: a.meet(a, ctx) == a
    /// * Commutative: a.meet(b, ctx) == b.meet(a, ctx)
    /// * Top is unit: top.meet(b, ctx) == b
    /// * Lower bound: a.meet(b, ctx) <= a and a.meet(b, ctx) <= b
    /// * Bottom is the smallest: bottom.meet(b, ctx) == bottom
    /// * Ordering is respected: a <= b => a.meet(b, ctx) == a
    fn meet(&self, other: &Self, ctx: &Self::LatticeContext) -> Self;
}

pub trait LatticeNoContext: Lattice {
    /// See [Lattice::top] for details. This version does not
    /// require a context.
    fn top_() -> Self;

    /// See [Lattice::meet] for details. This version does not
    /// require a context.
    fn meet_(&self, other: &Self) -> Self;
}

impl<L: Lattice<LatticeContext = ()>> LatticeNoContext for L {
    fn top_() -> Self {
        <L as Lattice>::top(&())
    }

    fn meet_(&self, other: &Self) -> Self {
        self.meet(other, &())
    }
}

/////////////////////////////////////
// Concrete domain implementations //
/////////////////////////////////////

/// The unit lattice is useful for testing, as a placeholder,
/// or as a building block in one of the lattice construction
/// methods (transformers) like the product lattice.
impl JoinSemiLattice for () {
    type LatticeContext = ();

    fn bottom(&(): &Self::LatticeContext) -> Self {}

    fn join(&self, &(): &Self, &(): &Self::LatticeContext) -> Self {}
}

impl Lattice for () {
    fn top(&(): &Self::LatticeContext) -> Self {}

    fn meet(&self, &(): &Self, &(): &Self::LatticeContext) -> Self {}
}

/// Bool is a lattice, where false is bottom and true is top,
/// join is or, meet is and.
impl JoinSemiLattice for bool {
    type LatticeContext = ();

    fn bottom(_ctx: &Self::LatticeContext) -> Self {
        false
    }

    fn join(&self, other: &Self, _ctx: &Self::LatticeContext) -> Self {
        *self || *other
    }
}

impl Lattice for bool {
    fn top(_ctx: &Self::LatticeContext) -> Self {
        true
    }

    fn meet(&self, other: &Self, _ctx: &Self::LatticeContext) -> Self {
        *self && *other
    }
}

/// In the power set lattice, the empty set is bottom, union is join
/// intersect is meet, and the full set is top. Note that, we rarely
/// need a general power set lattice. Usually, we can get a more
/// efficient implementation by using a bit set lattice by creating
/// a mapping between the natural numbers and the elements of the
/// set.
#[derive(PartialEq, Eq, Clone, Default)]
pub struct PowerSetDomain<T: Eq + Hash>(pub HashSet<T>);

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct PowerSetTop<T: Eq + Hash>(pub PowerSetDomain<T>);

impl<T: Eq + Hash> Deref for PowerSetDomain<T> {
    type Target = HashSet<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Eq + Hash> DerefMut for PowerSetDomain<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: Eq + Hash> PartialOrd for PowerSetDomain<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.is_superset(other), other.is_superset(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Greater),
            (false, true) => Some(Ordering::Less),
            (_, _) => None,
        }
    }
}

impl<T: Eq + Hash + Debug> Debug for PowerSetDomain<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut elements: Box<[String]> = self.iter().map(|x| format!("{x:?}")).collect();
        elements.sort_unstable();
        write!(f, "{{{}}}", elements.join(", "))
    }
}

impl<T: Eq + Hash + Debug + Clone> JoinSemiLattice for PowerSetDomain<T> {
    type LatticeContext = PowerSetTop<T>;

    fn bottom(_: &Self::LatticeContext) -> Self {
        Self(HashSet::new())
    }

    fn join(&self, other: &Self, _ctx: &Self::LatticeContext) -> Self {
        Self(self.union(other).cloned().collect())
    }
}

impl<T: Eq + Hash + Debug + Clone> Lattice for PowerSetDomain<T> {
    fn top(ctx: &Self::LatticeContext) -> Self {
        ctx.0.clone()
    }

    fn meet(&self, other: &Self, _ctx: &Self::LatticeContext) -> Self {
        Self(self.intersection(other).cloned().collect())
    }
}

/// An efficient implementation of a power set lattice. Use this over
/// the [`PowerSetDomain`] whenever possible.
#[derive(PartialEq, Eq, Clone)]
pub struct BitSetDomain(pub FixedBitSet);

impl Deref for BitSetDomain {
    type Target = FixedBitSet;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for BitSetDomain {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitSetTop(pub usize);

impl BitSetDomain {
    pub fn from(ctx: &BitSetTop, values: &[usize]) -> Self {
        let mut inner = FixedBitSet::with_capacity(ctx.0);
        for &v in values {
            inner.insert(v);
        }
        Self(inner)
    }
}

impl PartialOrd for BitSetDomain {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.is_superset(other), other.is_superset(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Greater),
            (false, true) => Some(Ordering::Less),
            (_, _) => None,
        }
    }
}

impl Debug for BitSetDomain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let elements: Vec<String> = self.ones().map(|x| x.to_string()).collect();
        write!(f, "{{{}}}", elements.join(", "))
    }
}

impl JoinSemiLattice for BitSetDomain {
    type LatticeContext = BitSetTop;

    fn bottom(ctx: &Self::LatticeContext) -> Self {
        Self(FixedBitSet::with_capacity(ctx.0))
    }

    fn join(&self, other: &Self, _ctx: &Self::LatticeContext) -> Self {
        let mut result = self.clone();
        result.union_with(other);
        result
    }
}

impl Lattice for BitSetDomain {
    fn top(ctx: &Self::LatticeContext) -> Self {
        let mut result = FixedBitSet::with_capacity(ctx.0);
        result.toggle_range(..);
        Self(result)
    }

    fn meet(&self, other: &Self, _ctx: &Self::LatticeContext) -> Self {
        let mut result = self.clone();
        result.intersect_with(other);
        result
    }
}

/// Lifts an arbitrary set of values into a lattice of height three:
///
/// ```txt
///        Top
///      / | | \
///    v1 v2 v3 ...
///      \ | | /
///       Bottom
/// ```
///
/// Distinct values are incomparable, joining them yields top. This is
/// the classic lattice for constant propagation.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Flat<T: Clone + Eq + Debug> {
    Bottom,
    Element(T),
    Top,
}

impl<T: Clone + Eq + Debug> From<T> for Flat<T> {
    fn from(value: T) -> Self {
        Flat::Element(value)
    }
}

impl<T: Clone + Eq + Debug + Display> Display for Flat<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Flat::Bottom => write!(f, "Bottom"),
            Flat::Element(value) => write!(f, "{value}"),
            Flat::Top => write!(f, "Top"),
        }
    }
}

impl<T: Clone + Eq + Debug> PartialOrd for Flat<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        match (self, other) {
            (Flat::Bottom, _) | (_, Flat::Top) => Some(Ordering::Less),
            (Flat::Top, _) | (_, Flat::Bottom) => Some(Ordering::Greater),
            _ => None,
        }
    }
}

impl<T: Clone + Eq + Debug> JoinSemiLattice for Flat<T> {
    type LatticeContext = ();

    fn bottom(_: &Self::LatticeContext) -> Self {
        Flat::Bottom
    }

    fn join(&self, other: &Self, _: &Self::LatticeContext) -> Self {
        match (self, other) {
            (Flat::Bottom, _) => other.clone(),
            (_, Flat::Bottom) => self.clone(),
            _ if self == other => self.clone(),
            _ => Flat::Top,
        }
    }
}

impl<T: Clone + Eq + Debug> Lattice for Flat<T> {
    fn top(_: &Self::LatticeContext) -> Self {
        Flat::Top
    }

    fn meet(&self, other: &Self, _: &Self::LatticeContext) -> Self {
        match (self, other) {
            (Flat::Top, _) => other.clone(),
            (_, Flat::Top) => self.clone(),
            _ if self == other => self.clone(),
            _ => Flat::Bottom,
        }
    }
}

///     Top
///   /  |  \
///   N  Z  P
///   \  |  /
///    Bottom
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum SignDomain {
    Top,
    Bottom,
    Negative,
    Zero,
    Positive,
}

impl From<i32> for SignDomain {
    fn from(val: i32) -> Self {
        match val.cmp(&0) {
            Ordering::Less => SignDomain::Negative,
            Ordering::Equal => SignDomain::Zero,
            Ordering::Greater => SignDomain::Positive,
        }
    }
}

impl From<i64> for SignDomain {
    fn from(val: i64) -> Self {
        match val.cmp(&0) {
            Ordering::Less => SignDomain::Negative,
            Ordering::Equal => SignDomain::Zero,
            Ordering::Greater => SignDomain::Positive,
        }
    }
}

impl Display for SignDomain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl PartialOrd for SignDomain {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        match other {
            SignDomain::Bottom => return Some(Ordering::Greater),
            SignDomain::Top => return Some(Ordering::Less),
            _ => {}
        }
        match self {
            SignDomain::Bottom => Some(Ordering::Less),
            SignDomain::Top => Some(Ordering::Greater),
            _ => None,
        }
    }
}

impl JoinSemiLattice for SignDomain {
    type LatticeContext = ();

    fn bottom(_: &Self::LatticeContext) -> Self {
        SignDomain::Bottom
    }

    fn join(&self, other: &Self, _: &Self::LatticeContext) -> Self {
        if self == other || *other == SignDomain::Bottom {
            return *self;
        }

        if *self == SignDomain::Bottom {
            return *other;
        }

        SignDomain::Top
    }
}

impl Lattice for SignDomain {
    fn top(_: &Self::LatticeContext) -> Self {
        SignDomain::Top
    }

    fn meet(&self, other: &Self, _: &Self::LatticeContext) -> Self {
        if self == other || *other == SignDomain::Top {
            return *self;
        }

        if *self == SignDomain::Top {
            return *other;
        }

        SignDomain::Bottom
    }
}

impl Add for SignDomain {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        use SignDomain::*;
        match (self, rhs) {
            (Top, _) | (_, Top) => Top,
            (Bottom, _) | (_, Bottom) => Bottom,
            (Zero, s) | (s, Zero) => s,
            (s1, s2) if s1 == s2 => s1,
            _ => Top,
        }
    }
}

impl Sub for SignDomain {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        self + -rhs
    }
}

impl Mul for SignDomain {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        use SignDomain::*;
        match (self, rhs) {
            (Bottom, _) | (_, Bottom) => Bottom,
            (Zero, _) | (_, Zero) => Zero,
            (Top, _) | (_, Top) => Top,
            (s1, s2) if s1 == s2 => Positive,
            _ => Negative,
        }
    }
}

impl Neg for SignDomain {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            SignDomain::Negative => SignDomain::Positive,
            SignDomain::Positive => SignDomain::Negative,
            _ => self,
        }
    }
}

/// Pointwise lifting of a lattice to a map, the usual representation of
/// the analysis state for variable based analyses. An absent key stands
/// for bottom, so the empty map is the bottom element and join takes the
/// union of the key sets joining the values present in both maps. The
/// height of the lattice is finite when the key universe and the value
/// lattice are finite.
#[derive(PartialEq, Eq, Clone)]
pub struct Map<K: Eq + Hash, D: JoinSemiLattice>(pub HashMap<K, D>);

/// Context for [`Map`]: the key universe and the context of the value
/// lattice. Analyses that only rely on the join semi-lattice operations
/// can leave the key universe empty, see
/// [`MapCtx::for_join_semi_lattice`]; the universe is only consulted by
/// [`Lattice::top`].
pub struct MapCtx<K: Eq + Hash, D: JoinSemiLattice>(pub HashSet<K>, pub D::LatticeContext);

impl<K: Eq + Hash, D: JoinSemiLattice> MapCtx<K, D> {
    pub fn for_join_semi_lattice() -> Self
    where
        D::LatticeContext: Default,
    {
        Self(HashSet::new(), D::LatticeContext::default())
    }
}

impl<K: Eq + Hash, D: JoinSemiLattice> Deref for Map<K, D> {
    type Target = HashMap<K, D>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K: Eq + Hash, D: JoinSemiLattice> DerefMut for Map<K, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K: Eq + Hash, D: JoinSemiLattice> Default for Map<K, D> {
    fn default() -> Self {
        Self(HashMap::new())
    }
}

impl<K: Eq + Hash + Debug, D: JoinSemiLattice> Debug for Map<K, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut entries: Box<[String]> = self
            .iter()
            .map(|(key, value)| format!("({key:?}, {value:?})"))
            .collect();
        entries.sort_unstable();
        write!(f, "Map({})", entries.join(", "))
    }
}

impl<K: Eq + Hash + Clone, D: JoinSemiLattice> Map<K, D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value bound to `key`, bottom when the key is absent.
    pub fn get_or_bottom(&self, key: &K, ctx: &MapCtx<K, D>) -> D {
        self.get(key).cloned().unwrap_or_else(|| D::bottom(&ctx.1))
    }

    /// The value bound to `key`, top when the key is absent. Useful when
    /// absent keys stand for values the analysis knows nothing about,
    /// e.g. the formal parameters of the analyzed function.
    pub fn get_or_top(&self, key: &K, ctx: &MapCtx<K, D>) -> D
    where
        D: Lattice,
    {
        self.get(key).cloned().unwrap_or_else(|| D::top(&ctx.1))
    }

    /// The bindings of `self` that are new or different compared to
    /// `previous`. Useful for reporting what an operation changed.
    pub fn changed_values(&self, previous: &Self) -> HashMap<K, D> {
        let mut result = HashMap::new();
        for (key, value) in self.iter() {
            if previous.get(key) != Some(value) {
                result.insert(key.clone(), value.clone());
            }
        }
        result
    }
}

impl<K: Eq + Hash + Clone + Debug, D: JoinSemiLattice> PartialOrd for Map<K, D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.0 == other.0 {
            return Some(Ordering::Equal);
        }
        let leq = self
            .iter()
            .all(|(key, value)| other.get(key).is_some_and(|o| value <= o));
        let geq = other
            .iter()
            .all(|(key, value)| self.get(key).is_some_and(|s| value <= s));
        match (leq, geq) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        }
    }
}

impl<K: Eq + Hash + Clone + Debug, D: JoinSemiLattice> JoinSemiLattice for Map<K, D> {
    type LatticeContext = MapCtx<K, D>;

    fn bottom(_: &Self::LatticeContext) -> Self {
        Self(HashMap::new())
    }

    fn join(&self, other: &Self, ctx: &Self::LatticeContext) -> Self {
        let mut result = self.0.clone();
        for (key, value) in &other.0 {
            result
                .entry(key.clone())
                .and_modify(|current| *current = current.join(value, &ctx.1))
                .or_insert_with(|| value.clone());
        }
        Self(result)
    }
}

impl<K: Eq + Hash + Clone + Debug, D: Lattice> Lattice for Map<K, D> {
    fn top(ctx: &Self::LatticeContext) -> Self {
        Self(
            ctx.0
                .iter()
                .map(|key| (key.clone(), D::top(&ctx.1)))
                .collect(),
        )
    }

    fn meet(&self, other: &Self, ctx: &Self::LatticeContext) -> Self {
        let mut result = HashMap::new();
        for (key, value) in &self.0 {
            if let Some(other_value) = other.get(key) {
                result.insert(key.clone(), value.meet(other_value, &ctx.1));
            }
        }
        Self(result)
    }
}
