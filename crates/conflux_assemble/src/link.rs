//! Leaves-first assembly of a whole task graph.

use crate::error::AssembleError;
use crate::upper::{assemble_upper, AssembleOptions};
use conflux_graph::{ArenaId, TaskGraph, TaskId};
use conflux_netlist::Module;
use std::collections::BTreeMap;
use tracing::info;

/// Known module interfaces, indexed by task.
///
/// Filled in build order: a task's slot is set only after all of its
/// children's are.
#[derive(Debug, Clone, Default)]
pub struct InterfaceTable {
    slots: Vec<Option<Module>>,
}

impl InterfaceTable {
    /// An empty table for every task of `graph`.
    pub fn new(graph: &TaskGraph) -> Self {
        Self {
            slots: vec![None; graph.tasks().count()],
        }
    }

    /// Records the interface of `module` for `id`, without its body.
    pub fn insert(&mut self, id: TaskId, module: &Module) {
        let index = id.as_raw() as usize;
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(module.interface());
    }

    /// The interface of `id`, if known.
    pub fn get(&self, id: TaskId) -> Option<&Module> {
        self.slots.get(id.as_raw() as usize)?.as_ref()
    }
}

/// Settings for a whole-graph link.
#[derive(Clone, Debug, Default)]
pub struct LinkOptions {
    /// Register level `L` for every upper task.
    pub register_level: u32,
    /// Partition counts for the top task's interconnects.
    pub partitions: BTreeMap<String, u32>,
}

/// Every assembled upper task, keyed by task name.
#[derive(Clone, Debug, Default)]
pub struct Linked {
    /// Assembled modules.
    pub modules: BTreeMap<String, Module>,
}

/// Assembles every upper task reachable from the top.
///
/// `leaves` maps each leaf task name to the interface its synthesizer
/// produced. Partition counts apply to the top task only, the level at
/// which floorplanning happens.
pub fn link(
    graph: &TaskGraph,
    leaves: &BTreeMap<String, Module>,
    options: &LinkOptions,
) -> Result<Linked, AssembleError> {
    let mut table = InterfaceTable::new(graph);
    let mut linked = Linked::default();
    let none = BTreeMap::new();

    for &id in graph.leaves_first() {
        let task = &graph[id];
        if task.is_leaf() {
            let iface = leaves
                .get(&task.name)
                .ok_or_else(|| AssembleError::MissingInterface {
                    task: task.name.clone(),
                })?;
            table.insert(id, iface);
            continue;
        }

        let partitions = if id == graph.top() {
            &options.partitions
        } else {
            &none
        };
        let module = assemble_upper(
            graph,
            id,
            &table,
            &AssembleOptions {
                register_level: options.register_level,
                partitions,
            },
        )?;
        table.insert(id, &module);
        linked.modules.insert(task.name.clone(), module);
    }

    info!(modules = linked.modules.len(), "link complete");
    Ok(linked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use conflux_netlist::{Assignment, Expr, ModuleEditor, Port, Signal};
    use serde_json::json;

    fn pass_through() -> TaskGraph {
        let doc = json!({
            "top": "Top",
            "tasks": {
                "Leaf": {"level": "leaf", "source": "leaf.cpp", "ports": [
                    {"name": "n", "category": "scalar", "width": 32}
                ]},
                "Top": {"level": "upper", "ports": [
                    {"name": "n", "category": "scalar", "width": 32}
                ], "instances": {
                    "Leaf": [{"args": {"n": {"arg": "n", "category": "scalar"}}}]
                }}
            }
        });
        TaskGraph::from_doc(&serde_json::from_value(doc).unwrap()).unwrap()
    }

    /// A leaf as a synthesizer ships it, with its own start/done logic.
    fn synthesized_leaf() -> Module {
        let mut leaf = Module::with_ports(
            "Leaf",
            vec![
                Port::input("ap_clk", 1),
                Port::input("ap_rst_n", 1),
                Port::input("ap_start", 1),
                Port::output("ap_done", 1),
                Port::output("ap_idle", 1),
                Port::output("ap_ready", 1),
                Port::input("n", 32),
            ],
        )
        .unwrap();
        leaf.add_signal(Signal::reg("ap_CS_fsm", 2)).unwrap();
        leaf.add_assignment(Assignment::new("ap_done", Expr::ident("ap_CS_fsm")));
        leaf
    }

    #[test]
    fn recorded_interfaces_drop_the_control_body() {
        let g = pass_through();
        let leaf_id = g.leaves().next().map(|(id, _)| id).unwrap();
        let mut table = InterfaceTable::new(&g);
        table.insert(leaf_id, &synthesized_leaf());

        let iface = table.get(leaf_id).unwrap();
        assert_eq!(iface.ports.len(), 7);
        assert!(iface.signals.is_empty());
        assert!(iface.assignments.is_empty());
    }

    #[test]
    fn leaf_control_logic_does_not_leak_into_parent() {
        let g = pass_through();
        let leaves = BTreeMap::from([("Leaf".to_string(), synthesized_leaf())]);
        let linked = link(&g, &leaves, &LinkOptions::default()).unwrap();

        let top = &linked.modules["Top"];
        assert!(top.instance("Leaf_0").is_some());
        assert!(top.signal("ap_CS_fsm").is_none());
    }
}
