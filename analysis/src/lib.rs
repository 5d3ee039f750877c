//! This crate contains a set of helpers to build static analysis tools based
//! on [abstract interpretation](https://en.wikipedia.org/wiki/Abstract_interpretation).
//! The building blocks include traits to describe
//! [control flow graphs](https://en.wikipedia.org/wiki/Control-flow_graph)
//! with conditional and exceptional edges, helpers for creating
//! [lattice](https://en.wikipedia.org/wiki/Lattice_(order)) domains,
//! and worklist based fixed-point solvers.
//! There are also a set of concrete lattice implementations like the
//! bitset lattice, the map lattice, flat lattices, and the sign lattice.
//!
//! Everything in this crate is independent of the analyzed input language;
//! look at the jflow-lib crate for an example front end that lowers a
//! Java-like syntax tree into a CFG and defines analyses using the
//! helpers in this crate.
//!
//! Some resources to learn more about abstract interpretation:
//! * [Static Program Analysis, Anders Møller and Michael I. Schwartzbach](https://cs.au.dk/~amoeller/spa/)
//! * [Introduction to Static Analysis, Xavier Rival and Kwangkeun Yi](https://mitpress.mit.edu/9780262043410/introduction-to-static-analysis/)
//! * [Principles of Abstract Interpretation](https://mitpress.mit.edu/9780262044905/principles-of-abstract-interpretation/)
//! * [Data Flow Analysis: Theory and Practice](https://www.amazon.com/Data-Flow-Analysis-Theory-Practice/dp/0849328802)
//! * [Data flow analysis: an informal introduction](https://clang.llvm.org/docs/DataFlowAnalysisIntro.html)

/// Traits for defining a control flow graph with labeled edges, and some
/// algorithms and data structures to make it easier to work with them,
/// like reverse post-order worklists.
pub mod cfg;

/// A curated collection of semi-lattices and lattices, including some
/// transformers to help building larger lattices from smaller ones.
pub mod domains;

/// Implementations of fixed-point iteration algorithms using worklists.
pub mod solvers;
