//! Structural queries: size, support, evaluation.

use oxidd_core::util::NodeSet;
use oxidd::{BooleanFunction, Function, InnerNode, LevelNo, Manager as DiagramManager};
use oxidd_core::{HasLevel, Node};

use crate::bdd::Bdd;
use crate::manager::Manager;

/// Collect the levels of all inner nodes reachable from `edge`.
fn collect_levels<M: DiagramManager<InnerNode: HasLevel>>(
    manager: &M,
    edge: &M::Edge,
    seen: &mut M::NodeSet,
    levels: &mut Vec<LevelNo>,
) {
    if !seen.insert(edge) {
        return;
    }
    if let Node::Inner(node) = manager.get_node(edge) {
        levels.push(node.level());
        for child in node.children() {
            collect_levels(manager, &*child, seen, levels);
        }
    }
}

impl Manager {
    /// Number of distinct nodes reachable from `f`, including the terminal.
    #[must_use]
    pub fn node_count(&self, f: Bdd) -> usize {
        self.function(f).node_count()
    }

    /// Variables labelling some node of `f`, in increasing order.
    ///
    /// Reduced BDDs have no redundant tests, so this is also the set of
    /// variables `f` semantically depends on.
    #[must_use]
    pub fn support(&self, f: Bdd) -> Vec<u32> {
        if f.is_constant() {
            return Vec::new();
        }
        let mut levels = Vec::new();
        self.function(f).with_manager_shared(|manager, edge| {
            let mut seen = Default::default();
            collect_levels(manager, edge, &mut seen, &mut levels);
        });
        let mut vars: Vec<u32> = levels.into_iter().map(|l| self.var_at_level(l)).collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    /// Evaluate `f` under an assignment of its variables.
    pub fn eval(&self, f: Bdd, assignment: impl Fn(u32) -> bool) -> bool {
        if f.is_constant() {
            return f.is_true();
        }
        let g = self.function(f);
        let args: Vec<(&_, bool)> = (0..self.num_vars())
            .map(|v| (self.var_function(v), assignment(v)))
            .collect();
        g.eval(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_count() {
        let mgr = Manager::new(3);
        assert_eq!(mgr.node_count(Bdd::TRUE), 1);
        assert_eq!(mgr.node_count(mgr.var(0)), 2);
        let f = mgr.and(mgr.var(0), mgr.var(1));
        assert_eq!(mgr.node_count(f), 3);
        assert_eq!(mgr.node_count(!f), 3);
    }

    #[test]
    fn test_support() {
        let mgr = Manager::new(5);
        let f = mgr.or(mgr.var(4), mgr.and(mgr.var(1), mgr.var(2)));
        assert_eq!(mgr.support(f), vec![1, 2, 4]);
        assert!(mgr.support(Bdd::FALSE).is_empty());
    }

    #[test]
    fn test_support_under_custom_order() {
        let mgr = Manager::with_order(vec![3, 1, 0, 2]).unwrap();
        let f = mgr.xor(mgr.var(2), mgr.var(3));
        assert_eq!(mgr.support(f), vec![2, 3]);
    }

    #[test]
    fn test_eval() {
        let mgr = Manager::new(2);
        let f = mgr.xor(mgr.var(0), mgr.var(1));
        assert!(mgr.eval(f, |v| v == 0));
        assert!(!mgr.eval(f, |_| true));
        assert!(mgr.eval(!f, |_| false));
        assert!(mgr.eval(Bdd::TRUE, |_| false));
    }
}
