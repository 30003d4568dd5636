//! Type-level list machinery backing the bean dependency graph.
//!
//! `TCons`/`TNil` form a compile-time heterogeneous list of the bean types an
//! `AppBuilder` has provided (`P`) or still requires (`R`). `Contains`,
//! `TAppend`, `AllSatisfied`, and `BuildableFrom` are marker traits with no
//! runtime behavior: they exist so that `build_state()` fails to compile when
//! a bean's dependencies, or a `BeanState`'s fields, were never provided.

use std::marker::PhantomData;

/// The empty type list.
pub struct TNil;

/// A non-empty type list: `Head` followed by `Tail`.
pub struct TCons<Head, Tail>(PhantomData<(Head, Tail)>);

/// Index witness: `T` is the head of the list.
pub struct Here;

/// Index witness: `T` is found in `Tail`, at index `I`.
pub struct There<I>(PhantomData<I>);

/// `Self` (a type list) contains `T`, witnessed by index `Idx`.
///
/// There is exactly one impl matching any given `(list, T)` pair, so `Idx` is
/// always inferred — callers never name it.
pub trait Contains<T, Idx> {}

impl<T, Tail> Contains<T, Here> for TCons<T, Tail> {}

impl<T, Head, Tail, Idx> Contains<T, There<Idx>> for TCons<Head, Tail> where Tail: Contains<T, Idx> {}

/// Append another type list onto the end of `Self`.
pub trait TAppend<Other> {
    type Output;
}

impl<Other> TAppend<Other> for TNil {
    type Output = Other;
}

impl<Head, Tail, Other> TAppend<Other> for TCons<Head, Tail>
where
    Tail: TAppend<Other>,
{
    type Output = TCons<Head, <Tail as TAppend<Other>>::Output>;
}

/// Every element of `Self` is present in `P`, witnessed by the index list `Idx`.
///
/// Used to check that a bean's (or plugin's) required dependency list is
/// fully covered by what has been provided so far.
pub trait AllSatisfied<P, Idx> {}

impl<P> AllSatisfied<P, TNil> for TNil {}

impl<Head, Tail, P, HIdx, TIdx> AllSatisfied<P, TCons<HIdx, TIdx>> for TCons<Head, Tail>
where
    P: Contains<Head, HIdx>,
    Tail: AllSatisfied<P, TIdx>,
{
}

/// `Self` can be constructed from the provided bean list `P`, witnessed by `Idx`.
///
/// Implemented by `#[derive(BeanState)]` for the generated state struct, with
/// one `Contains` bound per unique field type bundled into the `Idx` tuple.
pub trait BuildableFrom<P, Idx> {}
