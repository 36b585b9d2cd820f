//! Construction and validation of the immutable task graph.

use crate::arena::{Arena, ArenaId};
use crate::error::GraphConsistencyError;
use crate::ids::{InstanceId, TaskId};
use crate::input::{EndpointDoc, GraphDoc, TaskDoc};
use crate::instance::{Arg, Instance, InstanceKind, MmapUser};
use crate::interconnect::Interconnect;
use crate::port::{ArgCategory, Port};
use crate::task::{Task, TaskLevel};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::DfsPostOrder;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ops::Index;

/// The whole program after validation.
///
/// Tasks live in an arena addressed by [`TaskId`]; instances refer to their
/// task by ID, never by reference.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    tasks: Arena<TaskId, Task>,
    by_name: BTreeMap<String, TaskId>,
    top: TaskId,
    order: Vec<TaskId>,
}

impl TaskGraph {
    /// Decodes and validates a JSON task graph.
    pub fn from_json(text: &str) -> Result<Self, GraphConsistencyError> {
        Self::from_doc(&GraphDoc::from_json(text)?)
    }

    /// Validates a decoded document and builds the graph.
    pub fn from_doc(doc: &GraphDoc) -> Result<Self, GraphConsistencyError> {
        if !doc.tasks.contains_key(&doc.top) {
            return Err(GraphConsistencyError::UnknownTop {
                top: doc.top.clone(),
            });
        }

        // BTreeMap order, so IDs are stable across runs.
        let by_name: BTreeMap<String, TaskId> = doc
            .tasks
            .keys()
            .enumerate()
            .map(|(i, name)| (name.clone(), TaskId::from_raw(i as u32)))
            .collect();

        for (name, task) in &doc.tasks {
            check_shape(name, task, &by_name)?;
        }
        let order = leaves_first(doc, &by_name)?;

        let mut tasks = Arena::new();
        for (name, task_doc) in &doc.tasks {
            let task = match task_doc.level {
                TaskLevel::Leaf => Task {
                    name: name.clone(),
                    level: TaskLevel::Leaf,
                    source: task_doc.source.clone(),
                    ports: task_doc.ports.clone(),
                    instances: Arena::new(),
                    interconnects: Vec::new(),
                },
                TaskLevel::Upper => build_upper(name, task_doc, doc, &by_name)?,
            };
            tasks.alloc(task);
        }

        let top = by_name[&doc.top];
        tracing::debug!(tasks = tasks.len(), top = %doc.top, "task graph built");
        Ok(Self {
            tasks,
            by_name,
            top,
            order,
        })
    }

    /// The top task's ID.
    pub fn top(&self) -> TaskId {
        self.top
    }

    /// The top task.
    pub fn top_task(&self) -> &Task {
        &self.tasks[self.top]
    }

    /// Looks up a task by name.
    pub fn find(&self, name: &str) -> Option<TaskId> {
        self.by_name.get(name).copied()
    }

    /// Every task, reachable or not, in name order.
    pub fn tasks(&self) -> impl Iterator<Item = (TaskId, &Task)> {
        self.tasks.iter()
    }

    /// Tasks reachable from the top, every task after all of its children.
    pub fn leaves_first(&self) -> &[TaskId] {
        &self.order
    }

    /// Reachable leaf tasks, in build order.
    pub fn leaves(&self) -> impl Iterator<Item = (TaskId, &Task)> {
        self.order
            .iter()
            .map(|&id| (id, &self.tasks[id]))
            .filter(|(_, task)| task.is_leaf())
    }

    /// Distinct tasks instantiated directly by `id`, in ID order.
    pub fn children(&self, id: TaskId) -> Vec<TaskId> {
        let set: BTreeSet<TaskId> = self.tasks[id]
            .instances
            .values()
            .filter_map(Instance::task)
            .collect();
        set.into_iter().collect()
    }
}

impl Index<TaskId> for TaskGraph {
    type Output = Task;

    fn index(&self, id: TaskId) -> &Task {
        &self.tasks[id]
    }
}

fn check_shape(
    name: &str,
    task: &TaskDoc,
    by_name: &BTreeMap<String, TaskId>,
) -> Result<(), GraphConsistencyError> {
    let mut seen = HashSet::new();
    for port in &task.ports {
        if !seen.insert(port.name.as_str()) {
            return Err(GraphConsistencyError::DuplicatePort {
                task: name.to_string(),
                port: port.name.clone(),
            });
        }
    }

    match task.level {
        TaskLevel::Leaf => {
            let reason = if !task.instances.is_empty() || !task.fifos.is_empty() {
                Some("a leaf cannot have instances or interconnects")
            } else if task.source.is_none() {
                Some("no behavioral source")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(GraphConsistencyError::MalformedLeaf {
                    task: name.to_string(),
                    reason: reason.to_string(),
                });
            }
        }
        TaskLevel::Upper => {
            if let Some(child) = task.instances.keys().find(|c| !by_name.contains_key(*c)) {
                return Err(GraphConsistencyError::UnknownTask {
                    parent: name.to_string(),
                    task: child.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Post-order from the top over the task-reference graph.
fn leaves_first(
    doc: &GraphDoc,
    by_name: &BTreeMap<String, TaskId>,
) -> Result<Vec<TaskId>, GraphConsistencyError> {
    let mut graph: DiGraph<TaskId, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = by_name.values().map(|&id| graph.add_node(id)).collect();
    for (name, task) in &doc.tasks {
        let parent = nodes[by_name[name].as_raw() as usize];
        // Reverse order so the post-order visits children alphabetically.
        for child in task.instances.keys().rev() {
            graph.update_edge(parent, nodes[by_name[child].as_raw() as usize], ());
        }
    }

    if let Err(cycle) = petgraph::algo::toposort(&graph, None) {
        let id = graph[cycle.node_id()];
        let name = by_name
            .iter()
            .find(|(_, &v)| v == id)
            .map(|(k, _)| k.clone())
            .unwrap_or_default();
        return Err(GraphConsistencyError::CyclicTaskReference { task: name });
    }

    let top = nodes[by_name[&doc.top].as_raw() as usize];
    let mut dfs = DfsPostOrder::new(&graph, top);
    let mut order = Vec::new();
    while let Some(node) = dfs.next(&graph) {
        order.push(graph[node]);
    }
    Ok(order)
}

/// Literal scalar values such as `0`, `64'd0` or `8'hff`.
fn is_scalar_literal(text: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '_');
    match text.split_once('\'') {
        None => digits(text),
        Some((size, value)) => {
            let value = value.strip_prefix(['s', 'S']).unwrap_or(value);
            let mut chars = value.chars();
            let base_ok = matches!(chars.next(), Some('b' | 'B' | 'o' | 'O' | 'd' | 'D' | 'h' | 'H'));
            let rest = chars.as_str();
            (size.is_empty() || digits(size))
                && base_ok
                && !rest.is_empty()
                && rest
                    .chars()
                    .all(|c| c.is_ascii_hexdigit() || matches!(c, '_' | 'x' | 'X' | 'z' | 'Z'))
        }
    }
}

fn build_upper(
    name: &str,
    task: &TaskDoc,
    doc: &GraphDoc,
    by_name: &BTreeMap<String, TaskId>,
) -> Result<Task, GraphConsistencyError> {
    let mut instances: Vec<Instance> = Vec::new();
    for (child_name, records) in &task.instances {
        let child = &doc.tasks[child_name];
        for (index, record) in records.iter().enumerate() {
            let inst_name = Instance::task_instance_name(child_name, index as u32);

            for (port_name, arg) in &record.args {
                let port = child.ports.iter().find(|p| &p.name == port_name).ok_or_else(|| {
                    GraphConsistencyError::MissingChildPort {
                        instance: inst_name.clone(),
                        port: port_name.clone(),
                    }
                })?;
                if port.category != arg.category {
                    return Err(GraphConsistencyError::CategoryMismatch {
                        instance: inst_name.clone(),
                        port: port_name.clone(),
                        expected: port.category,
                        found: arg.category,
                    });
                }
            }

            let mut args = Vec::with_capacity(child.ports.len());
            for port in &child.ports {
                let bound = record.args.get(&port.name).ok_or_else(|| {
                    GraphConsistencyError::UnboundPort {
                        instance: inst_name.clone(),
                        port: port.name.clone(),
                    }
                })?;
                check_arg_source(&inst_name, port, &bound.arg, task)?;
                args.push(Arg {
                    port: port.name.clone(),
                    name: bound.arg.clone(),
                    category: port.category,
                    shared: false,
                });
            }

            instances.push(Instance {
                name: inst_name,
                kind: InstanceKind::Task {
                    task: by_name[child_name],
                    task_name: child_name.clone(),
                    index: index as u32,
                },
                step: record.step,
                args,
            });
        }
    }

    mark_shared(&mut instances)?;

    let mut arena: Arena<InstanceId, Instance> = Arena::new();
    for inst in instances {
        arena.alloc(inst);
    }

    let mut interconnects = Vec::with_capacity(task.fifos.len());
    for fifo in task.fifos.keys() {
        interconnects.push(build_interconnect(name, fifo, task, doc, &arena)?);
    }

    for implicit in implicit_instances(task, doc, &arena) {
        arena.alloc(implicit);
    }

    Ok(Task {
        name: name.to_string(),
        level: TaskLevel::Upper,
        source: None,
        ports: task.ports.clone(),
        instances: arena,
        interconnects,
    })
}

fn check_arg_source(
    instance: &str,
    port: &Port,
    arg: &str,
    parent: &TaskDoc,
) -> Result<(), GraphConsistencyError> {
    let unknown = || GraphConsistencyError::UnknownArgSource {
        instance: instance.to_string(),
        port: port.name.clone(),
        arg: arg.to_string(),
    };

    if port.category.is_stream() {
        return if parent.fifos.contains_key(arg) {
            Ok(())
        } else {
            Err(unknown())
        };
    }

    match parent.ports.iter().find(|p| p.name == arg) {
        Some(parent_port) if port.category.accepts_parent(parent_port.category) => Ok(()),
        Some(parent_port) => Err(GraphConsistencyError::CategoryMismatch {
            instance: instance.to_string(),
            port: port.name.clone(),
            expected: port.category,
            found: parent_port.category,
        }),
        None if port.category == ArgCategory::Scalar && is_scalar_literal(arg) => Ok(()),
        None => Err(unknown()),
    }
}

/// Marks memory args bound more than once in this parent as shared.
fn mark_shared(instances: &mut [Instance]) -> Result<(), GraphConsistencyError> {
    let mut uses: BTreeMap<String, (usize, ArgCategory)> = BTreeMap::new();
    for arg in instances.iter().flat_map(|i| &i.args) {
        if arg.category.is_mmap() {
            uses.entry(arg.name.clone())
                .or_insert((0, arg.category))
                .0 += 1;
        }
    }

    for (arg, (count, category)) in &uses {
        if *count > 1 && *category == ArgCategory::Hmap {
            return Err(GraphConsistencyError::UnsupportedSharing {
                arg: arg.clone(),
                category: *category,
            });
        }
    }

    for arg in instances.iter_mut().flat_map(|i| i.args.iter_mut()) {
        if let Some((count, _)) = uses.get(&arg.name) {
            arg.shared = arg.category.is_mmap() && *count > 1;
        }
    }
    Ok(())
}

fn resolve_endpoint(
    task: &str,
    fifo: &str,
    role: &str,
    endpoint: &Option<EndpointDoc>,
    arena: &Arena<InstanceId, Instance>,
) -> Result<Option<InstanceId>, GraphConsistencyError> {
    let Some(EndpointDoc(child, index)) = endpoint else {
        return Ok(None);
    };
    let inst_name = Instance::task_instance_name(child, *index);
    arena
        .iter()
        .find(|(_, inst)| inst.name == inst_name)
        .map(|(id, _)| Some(id))
        .ok_or_else(|| GraphConsistencyError::MalformedInterconnect {
            task: task.to_string(),
            interconnect: fifo.to_string(),
            reason: format!("{role} `{inst_name}` is not an instance of this task"),
        })
}

fn build_interconnect(
    task_name: &str,
    fifo: &str,
    task: &TaskDoc,
    doc: &GraphDoc,
    arena: &Arena<InstanceId, Instance>,
) -> Result<Interconnect, GraphConsistencyError> {
    let record = &task.fifos[fifo];
    let malformed = |reason: String| GraphConsistencyError::MalformedInterconnect {
        task: task_name.to_string(),
        interconnect: fifo.to_string(),
        reason,
    };

    let producer = resolve_endpoint(task_name, fifo, "producer", &record.producer, arena)?;
    let consumer = resolve_endpoint(task_name, fifo, "consumer", &record.consumer, arena)?;

    let bound = |category: ArgCategory| -> Vec<InstanceId> {
        arena
            .iter()
            .filter(|(_, inst)| {
                inst.args
                    .iter()
                    .any(|a| a.category == category && a.name == fifo)
            })
            .map(|(id, _)| id)
            .collect()
    };
    let writers = bound(ArgCategory::Ostream);
    let readers = bound(ArgCategory::Istream);
    let expect = |role: &str, found: &[InstanceId], wanted: Option<InstanceId>| {
        let wanted: Vec<InstanceId> = wanted.into_iter().collect();
        if found == wanted.as_slice() {
            Ok(())
        } else {
            let names: Vec<&str> = found.iter().map(|&id| arena[id].name.as_str()).collect();
            Err(malformed(format!(
                "expected {} {role}(s) among bindings, found [{}]",
                wanted.len(),
                names.join(", ")
            )))
        }
    };
    expect("writer", &writers, producer)?;
    expect("reader", &readers, consumer)?;

    // Width of the child port bound to this fifo on the given instance.
    let child_width = |id: InstanceId| -> u32 {
        let inst = &arena[id];
        let port = inst
            .args
            .iter()
            .find(|a| a.name == fifo && a.category.is_stream())
            .map(|a| a.port.as_str());
        match (&inst.kind, port) {
            (InstanceKind::Task { task_name, .. }, Some(port)) => doc.tasks[task_name]
                .ports
                .iter()
                .find(|p| p.name == port)
                .map_or(0, |p| p.width),
            _ => 0,
        }
    };

    let boundary = |expected: ArgCategory| {
        task.ports
            .iter()
            .find(|p| p.name == fifo && p.category == expected)
            .ok_or_else(|| {
                malformed(format!(
                    "pass-through needs an {expected} boundary port named `{fifo}`"
                ))
            })
    };

    let (producer_width, consumer_width) = match (record.depth, producer, consumer) {
        (Some(0), _, _) => return Err(malformed("depth must be positive".to_string())),
        (Some(_), Some(p), Some(c)) => (child_width(p), child_width(c)),
        (Some(_), _, _) => {
            return Err(malformed(
                "a buffered interconnect needs both a producer and a consumer".to_string(),
            ))
        }
        (None, Some(p), None) => (child_width(p), boundary(ArgCategory::Ostream)?.width),
        (None, None, Some(c)) => (boundary(ArgCategory::Istream)?.width, child_width(c)),
        (None, _, _) => {
            return Err(malformed(
                "a pass-through interconnect needs exactly one instance endpoint".to_string(),
            ))
        }
    };

    if producer_width != consumer_width {
        return Err(GraphConsistencyError::WidthMismatch {
            interconnect: fifo.to_string(),
            producer_width,
            consumer_width,
        });
    }

    Ok(Interconnect {
        name: fifo.to_string(),
        depth: record.depth,
        producer,
        consumer,
        width: producer_width,
    })
}

/// Demultiplexers for async memory users, then arbiters for shared memories.
///
/// Only leaf users get a demultiplexer: an upper child already converts its
/// async memory ports to M-AXI inside its own body.
fn implicit_instances(
    task: &TaskDoc,
    doc: &GraphDoc,
    arena: &Arena<InstanceId, Instance>,
) -> Vec<Instance> {
    let width_of = |arg: &str| {
        task.ports
            .iter()
            .find(|p| p.name == arg)
            .map_or(0, |p| p.width)
    };

    let mut demuxes = Vec::new();
    let mut shared: BTreeMap<String, Vec<MmapUser>> = BTreeMap::new();
    for (id, inst) in arena.iter() {
        let leaf_user = match &inst.kind {
            InstanceKind::Task { task_name, .. } => doc.tasks[task_name].level == TaskLevel::Leaf,
            _ => false,
        };
        for arg in &inst.args {
            let asynchronous = leaf_user && arg.category == ArgCategory::AsyncMmap;
            if asynchronous {
                let net = arg.net(&inst.name);
                demuxes.push(Instance {
                    name: format!("{net}__async_mmap"),
                    kind: InstanceKind::AsyncMmap {
                        net,
                        user: id,
                        port: arg.port.clone(),
                        width: width_of(&arg.name),
                    },
                    step: inst.step,
                    args: Vec::new(),
                });
            }
            if arg.shared {
                shared.entry(arg.name.clone()).or_default().push(MmapUser {
                    instance: id,
                    port: arg.port.clone(),
                    net: arg.net(&inst.name),
                    asynchronous,
                });
            }
        }
    }

    let arbiters = shared.into_iter().map(|(arg, users)| Instance {
        name: format!("{arg}__arbiter"),
        kind: InstanceKind::Arbiter {
            width: width_of(&arg),
            arg,
            users,
        },
        step: 0,
        args: Vec::new(),
    });

    demuxes.into_iter().chain(arbiters).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Load -> Add -> Store, with Load/Store sharing one memory.
    fn vadd() -> serde_json::Value {
        json!({
            "top": "VecAdd",
            "tasks": {
                "Load": {"level": "leaf", "source": "load.cpp", "ports": [
                    {"name": "mem", "category": "mmap", "width": 32},
                    {"name": "n", "category": "scalar", "width": 64},
                    {"name": "out", "category": "ostream", "width": 32}
                ]},
                "Add": {"level": "leaf", "source": "add.cpp", "ports": [
                    {"name": "a", "category": "istream", "width": 32},
                    {"name": "b", "category": "ostream", "width": 32}
                ]},
                "Store": {"level": "leaf", "source": "store.cpp", "ports": [
                    {"name": "in", "category": "istream", "width": 32},
                    {"name": "mem", "category": "mmap", "width": 32}
                ]},
                "VecAdd": {"level": "upper", "ports": [
                    {"name": "gmem", "category": "mmap", "width": 32},
                    {"name": "n", "category": "scalar", "width": 64}
                ], "instances": {
                    "Load": [{"args": {
                        "mem": {"arg": "gmem", "category": "mmap"},
                        "n": {"arg": "n", "category": "scalar"},
                        "out": {"arg": "a_q", "category": "ostream"}
                    }}],
                    "Add": [{"args": {
                        "a": {"arg": "a_q", "category": "istream"},
                        "b": {"arg": "b_q", "category": "ostream"}
                    }}],
                    "Store": [{"args": {
                        "in": {"arg": "b_q", "category": "istream"},
                        "mem": {"arg": "gmem", "category": "mmap"}
                    }}]
                }, "fifos": {
                    "a_q": {"depth": 8, "producer": ["Load", 0], "consumer": ["Add", 0]},
                    "b_q": {"depth": 2, "producer": ["Add", 0], "consumer": ["Store", 0]}
                }}
            }
        })
    }

    fn build(value: serde_json::Value) -> Result<TaskGraph, GraphConsistencyError> {
        TaskGraph::from_doc(&serde_json::from_value(value).unwrap())
    }

    #[test]
    fn builds_valid_graph() {
        let graph = build(vadd()).unwrap();
        let top = graph.top_task();
        assert_eq!(top.name, "VecAdd");
        assert_eq!(top.interconnects.len(), 2);
        let a_q = top.interconnect("a_q").unwrap();
        assert_eq!(a_q.width, 32);
        assert_eq!(a_q.depth, Some(8));
        let (p, c) = a_q.endpoints().unwrap();
        assert_eq!(top.instances[p].name, "Load_0");
        assert_eq!(top.instances[c].name, "Add_0");
    }

    #[test]
    fn leaves_come_before_parents() {
        let graph = build(vadd()).unwrap();
        let order: Vec<&str> = graph
            .leaves_first()
            .iter()
            .map(|&id| graph[id].name.as_str())
            .collect();
        assert_eq!(order.last(), Some(&"VecAdd"));
        assert_eq!(order.len(), 4);
        assert_eq!(graph.leaves().count(), 3);
    }

    #[test]
    fn args_follow_child_port_order() {
        let graph = build(vadd()).unwrap();
        let (_, load) = graph.top_task().instance_by_name("Load_0").unwrap();
        let ports: Vec<&str> = load.args.iter().map(|a| a.port.as_str()).collect();
        assert_eq!(ports, vec!["mem", "n", "out"]);
    }

    #[test]
    fn shared_memory_gets_arbiter() {
        let graph = build(vadd()).unwrap();
        let top = graph.top_task();
        let (_, load) = top.instance_by_name("Load_0").unwrap();
        assert!(load.arg("mem").unwrap().shared);
        assert!(!load.arg("n").unwrap().shared);

        let (_, arbiter) = top.instance_by_name("gmem__arbiter").unwrap();
        match &arbiter.kind {
            InstanceKind::Arbiter { arg, users, width } => {
                assert_eq!(arg, "gmem");
                assert_eq!(*width, 32);
                let nets: Vec<&str> = users.iter().map(|u| u.net.as_str()).collect();
                assert_eq!(nets, vec!["gmem___Load_0___mem", "gmem___Store_0___mem"]);
            }
            other => panic!("expected arbiter, got {other:?}"),
        }
        assert!(!arbiter.is_controlled());
    }

    #[test]
    fn async_memory_gets_demux() {
        let mut v = vadd();
        v["tasks"]["Store"]["ports"][1]["category"] = json!("async_mmap");
        v["tasks"]["VecAdd"]["instances"]["Store"][0]["args"]["mem"]["category"] =
            json!("async_mmap");
        let graph = build(v).unwrap();
        let top = graph.top_task();
        assert!(top.instance_by_name("gmem___Store_0___mem__async_mmap").is_some());
        assert!(top.instance_by_name("gmem__arbiter").is_some());
    }

    #[test]
    fn undefined_top() {
        let mut v = vadd();
        v["top"] = json!("Nope");
        assert_eq!(
            build(v).unwrap_err(),
            GraphConsistencyError::UnknownTop {
                top: "Nope".to_string()
            }
        );
    }

    #[test]
    fn cycle_is_rejected() {
        let mut v = vadd();
        v["tasks"]["Add"] = json!({"level": "upper", "ports": [], "instances": {
            "VecAdd": [{"args": {}}]
        }});
        let err = build(v).unwrap_err();
        assert!(matches!(err, GraphConsistencyError::CyclicTaskReference { .. }));
    }

    #[test]
    fn category_mismatch_names_instance_and_port() {
        let mut v = vadd();
        v["tasks"]["VecAdd"]["instances"]["Add"][0]["args"]["a"]["category"] = json!("ostream");
        assert_eq!(
            build(v).unwrap_err(),
            GraphConsistencyError::CategoryMismatch {
                instance: "Add_0".to_string(),
                port: "a".to_string(),
                expected: ArgCategory::Istream,
                found: ArgCategory::Ostream,
            }
        );
    }

    #[test]
    fn unbound_port_is_fatal() {
        let mut v = vadd();
        v["tasks"]["VecAdd"]["instances"]["Load"][0]["args"]
            .as_object_mut()
            .unwrap()
            .remove("n");
        assert_eq!(
            build(v).unwrap_err(),
            GraphConsistencyError::UnboundPort {
                instance: "Load_0".to_string(),
                port: "n".to_string(),
            }
        );
    }

    #[test]
    fn binding_to_missing_child_port_is_fatal() {
        let mut v = vadd();
        v["tasks"]["VecAdd"]["instances"]["Add"][0]["args"]["c"] =
            json!({"arg": "b_q", "category": "ostream"});
        assert_eq!(
            build(v).unwrap_err(),
            GraphConsistencyError::MissingChildPort {
                instance: "Add_0".to_string(),
                port: "c".to_string(),
            }
        );
    }

    #[test]
    fn scalar_literal_is_accepted() {
        let mut v = vadd();
        v["tasks"]["VecAdd"]["instances"]["Load"][0]["args"]["n"]["arg"] = json!("64'd1024");
        assert!(build(v).is_ok());

        let mut v = vadd();
        v["tasks"]["VecAdd"]["instances"]["Load"][0]["args"]["n"]["arg"] = json!("count");
        assert!(matches!(
            build(v).unwrap_err(),
            GraphConsistencyError::UnknownArgSource { .. }
        ));
    }

    #[test]
    fn buffered_interconnect_needs_both_endpoints() {
        let mut v = vadd();
        v["tasks"]["VecAdd"]["fifos"]["a_q"]
            .as_object_mut()
            .unwrap()
            .remove("consumer");
        let err = build(v).unwrap_err();
        match err {
            GraphConsistencyError::MalformedInterconnect { interconnect, .. } => {
                assert_eq!(interconnect, "a_q")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn width_mismatch_is_fatal() {
        let mut v = vadd();
        v["tasks"]["Add"]["ports"][0]["width"] = json!(64);
        assert_eq!(
            build(v).unwrap_err(),
            GraphConsistencyError::WidthMismatch {
                interconnect: "a_q".to_string(),
                producer_width: 32,
                consumer_width: 64,
            }
        );
    }

    #[test]
    fn pass_through_takes_boundary_width() {
        let mut v = vadd();
        v["tasks"]["VecAdd"]["ports"]
            .as_array_mut()
            .unwrap()
            .push(json!({"name": "b_q", "category": "ostream", "width": 32}));
        v["tasks"]["VecAdd"]["fifos"]["b_q"] = json!({"producer": ["Add", 0]});
        v["tasks"]["VecAdd"]["instances"]["Store"] = json!([]);
        let graph = build(v).unwrap();
        let b_q = graph.top_task().interconnect("b_q").unwrap();
        assert!(b_q.is_pass_through());
        assert_eq!(b_q.width, 32);
        assert!(b_q.consumer.is_none());
    }

    #[test]
    fn leaf_without_source_is_fatal() {
        let mut v = vadd();
        v["tasks"]["Add"].as_object_mut().unwrap().remove("source");
        assert!(matches!(
            build(v).unwrap_err(),
            GraphConsistencyError::MalformedLeaf { task, .. } if task == "Add"
        ));
    }

    #[test]
    fn literal_recognizer() {
        assert!(is_scalar_literal("0"));
        assert!(is_scalar_literal("64'd0"));
        assert!(is_scalar_literal("'hff"));
        assert!(is_scalar_literal("8'sb1010_0101"));
        assert!(!is_scalar_literal("n"));
        assert!(!is_scalar_literal("8'q1"));
        assert!(!is_scalar_literal("8'd"));
    }
}
