//! Term DAGs with structural sharing
//!
//! A [`TermDag`] stores every distinct subterm of a term exactly once in an
//! arena. Application nodes refer to their arguments by [`NodeId`], so shared
//! subterms are shared nodes and no ownership cycles can arise. Traversals
//! are plain functions over the arena.

use super::core::term::{Constant, FunctionSymbol, Term, Variable};
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DagNode {
    Variable(Variable),
    Constant(Constant),
    Function(FunctionSymbol, Vec<NodeId>),
}

/// An edge from an application to its argument, labelled with the
/// argument index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DagEdge {
    pub parent: NodeId,
    pub child: NodeId,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct TermDag {
    nodes: Vec<DagNode>,
    index: HashMap<Term, NodeId>,
    root: NodeId,
}

impl TermDag {
    pub fn from_term(term: &Term) -> Self {
        let mut dag = TermDag {
            nodes: Vec::new(),
            index: HashMap::new(),
            root: NodeId(0),
        };
        dag.root = dag.intern(term);
        dag
    }

    fn intern(&mut self, term: &Term) -> NodeId {
        if let Some(&id) = self.index.get(term) {
            return id;
        }
        let node = match term {
            Term::Variable(v) => DagNode::Variable(*v),
            Term::Constant(c) => DagNode::Constant(*c),
            Term::Function(f, args) => {
                let children = args.iter().map(|arg| self.intern(arg)).collect();
                DagNode::Function(*f, children)
            }
        };
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.index.insert(term.clone(), id);
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&DagNode> {
        self.nodes.get(id.0)
    }

    /// Node of a subterm, if it occurs in the DAG
    pub fn lookup(&self, term: &Term) -> Option<NodeId> {
        self.index.get(term).copied()
    }

    /// Number of distinct subterms
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(id.0) {
            Some(DagNode::Function(_, children)) => children,
            _ => &[],
        }
    }

    /// Every argument edge in pre-order. A subterm used twice by the same
    /// parent yields two edges with different indices.
    pub fn edges(&self) -> Vec<DagEdge> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            for (index, &child) in self.children(id).iter().enumerate() {
                out.push(DagEdge {
                    parent: id,
                    child,
                    index,
                });
            }
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Depth-first node order from the root, each node once
    pub fn dfs_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Breadth-first node order from the root, each node once
    pub fn bfs_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([self.root]);
        let mut queue = VecDeque::from([self.root]);
        while let Some(id) = queue.pop_front() {
            out.push(id);
            for &child in self.children(id) {
                if seen.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        out
    }

    /// Rebuild the term rooted at `id`
    pub fn to_term(&self, id: NodeId) -> Option<Term> {
        Some(match self.nodes.get(id.0)? {
            DagNode::Variable(v) => Term::Variable(*v),
            DagNode::Constant(c) => Term::Constant(*c),
            DagNode::Function(f, children) => {
                let args = children
                    .iter()
                    .map(|&c| self.to_term(c))
                    .collect::<Option<Vec<_>>>()?;
                Term::app(*f, args)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Interner, SymbolTheory};

    #[test]
    fn test_shared_subterms_are_stored_once() {
        let mut interner = Interner::new();
        let f = interner.function("f", 2, SymbolTheory::Free);
        let g = interner.function("g", 1, SymbolTheory::Free);
        let a = Term::Constant(interner.constant("a"));
        let ga = Term::app(g, vec![a.clone()]);
        let t = Term::app(f, vec![ga.clone(), ga.clone()]);

        let dag = TermDag::from_term(&t);
        // a, g(a), f(g(a), g(a))
        assert_eq!(dag.len(), 3);
        assert_eq!(dag.to_term(dag.root()), Some(t));

        let ga_id = dag.lookup(&ga).unwrap();
        let edges = dag.edges();
        assert_eq!(edges.len(), 3);
        assert_eq!(
            edges[0],
            DagEdge {
                parent: dag.root(),
                child: ga_id,
                index: 0
            }
        );
        assert_eq!(edges[1].index, 1);
    }

    #[test]
    fn test_traversal_orders() {
        let mut interner = Interner::new();
        let f = interner.function("f", 2, SymbolTheory::Free);
        let g = interner.function("g", 1, SymbolTheory::Free);
        let a = Term::Constant(interner.constant("a"));
        let b = Term::Constant(interner.constant("b"));
        let ga = Term::app(g, vec![a.clone()]);
        let t = Term::app(f, vec![ga.clone(), b.clone()]);

        let dag = TermDag::from_term(&t);
        let id = |term: &Term| dag.lookup(term).unwrap();

        assert_eq!(dag.dfs_nodes(), vec![id(&t), id(&ga), id(&a), id(&b)]);
        assert_eq!(dag.bfs_nodes(), vec![id(&t), id(&ga), id(&b), id(&a)]);
    }

    #[test]
    fn test_ac_variants_share_a_node() {
        let mut interner = Interner::new();
        let f = interner.function("f", 2, SymbolTheory::AssociativeCommutative);
        let h = interner.function("h", 2, SymbolTheory::Free);
        let a = Term::Constant(interner.constant("a"));
        let b = Term::Constant(interner.constant("b"));
        let t = Term::app(
            h,
            vec![
                Term::app(f, vec![a.clone(), b.clone()]),
                Term::app(f, vec![b.clone(), a.clone()]),
            ],
        );

        let dag = TermDag::from_term(&t);
        assert_eq!(dag.len(), 4);
    }
}
