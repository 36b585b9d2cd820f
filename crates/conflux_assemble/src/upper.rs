//! Structural assembly of one upper task.

use crate::error::AssembleError;
use crate::fifo::emit_interconnect;
use crate::interface::{handshake_ports, ports_for};
use crate::link::InterfaceTable;
use crate::mmap::{arbiter_id_width, emit_arbiter, emit_demux, ArbiterUser, DemuxSpec};
use crate::naming::{
    m_axi_prefix, mmap_channels, offset_name, stream_width, AsyncTag, AxiWidth, ADDR_WIDTH,
    BASE_ID_WIDTH, ISTREAM_SUFFIXES, M_AXI_FIELDS, OSTREAM_SUFFIXES,
};
use conflux_fsm::{
    emit_instance_controller, emit_task_fsm, CLK, DONE, IDLE, READY, RST_N, START,
};
use conflux_graph::{
    Arg, ArgCategory, GraphConsistencyError, Instance, InstanceId, InstanceKind, Task, TaskGraph,
    TaskId,
};
use conflux_netlist::{
    Connection, Expr, Instance as Cell, Module, ModuleEditor, Pipeline, Signal,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Per-task assembly settings.
#[derive(Clone, Debug)]
pub struct AssembleOptions<'a> {
    /// Register level `L` shared by every control and scalar pipeline.
    pub register_level: u32,
    /// Partition count per interconnect name; absent means one.
    pub partitions: &'a BTreeMap<String, u32>,
}

/// What a leaf async-memory user left for its demultiplexer.
struct AsyncUse {
    tags: Vec<AsyncTag>,
    offset: String,
}

/// Builds the complete structural body of upper task `id`.
///
/// Every child's interface must already be in `interfaces`; the graph's
/// leaves-first order guarantees this when called from [`crate::link`].
pub fn assemble_upper(
    graph: &TaskGraph,
    id: TaskId,
    interfaces: &InterfaceTable,
    options: &AssembleOptions<'_>,
) -> Result<Module, AssembleError> {
    let task = &graph[id];
    let level = options.register_level;

    let user_ids = master_id_widths(graph, task, interfaces)?;
    let boundary_id = |port: &str| -> u32 {
        let ids: Vec<u32> = user_ids
            .iter()
            .filter(|(arg, _, _)| arg == port)
            .map(|&(_, _, w)| w)
            .collect();
        match ids.len() {
            0 => BASE_ID_WIDTH,
            1 => ids[0],
            _ => arbiter_id_width(&ids),
        }
    };

    let mut ports = handshake_ports();
    for port in &task.ports {
        ports.extend(ports_for(port, boundary_id(&port.name)));
    }
    let mut module = Module::with_ports(task.name.clone(), ports)?;

    for ic in &task.interconnects {
        let partitions = options.partitions.get(&ic.name).copied().unwrap_or(1);
        emit_interconnect(&mut module, ic, partitions)?;
    }

    let mut is_done = Vec::new();
    let mut async_uses: BTreeMap<(InstanceId, String), AsyncUse> = BTreeMap::new();
    for (inst_id, inst) in task.instances.iter() {
        let InstanceKind::Task {
            task: child_id,
            task_name,
            ..
        } = &inst.kind
        else {
            continue;
        };
        let child = &graph[*child_id];
        let iface = interfaces
            .get(*child_id)
            .ok_or_else(|| AssembleError::MissingInterface {
                task: task_name.clone(),
            })?;

        let signals = emit_instance_controller(&mut module, &inst.name, level, inst.is_autorun())?;
        if let Some(flag) = signals.is_done {
            is_done.push(flag);
        }

        let mut wiring = Wiring {
            module: &mut module,
            iface,
            child,
            inst,
            level,
            connections: Vec::new(),
        };
        wiring.connect(CLK, Expr::ident(CLK))?;
        wiring.connect(RST_N, Expr::ident(signals.reset))?;
        wiring.connect(START, Expr::ident(signals.start))?;
        wiring.connect(DONE, Expr::ident(signals.done))?;
        wiring.connect(IDLE, Expr::ident(signals.idle))?;
        wiring.connect(READY, Expr::ident(signals.ready))?;

        for arg in &inst.args {
            let channels = child.port(&arg.port).map_or(1, |p| p.channels());
            match arg.category {
                ArgCategory::Scalar => {
                    let init = if task.port(&arg.name).is_some() {
                        Expr::ident(arg.name.clone())
                    } else {
                        Expr::Literal(arg.name.clone())
                    };
                    let width = wiring.graph_width(&arg.port)?;
                    wiring.scalar(&arg.port, width, init)?;
                }
                ArgCategory::Istream => wiring.stream(arg, &ISTREAM_SUFFIXES)?,
                ArgCategory::Ostream => wiring.stream(arg, &OSTREAM_SUFFIXES)?,
                ArgCategory::AsyncMmap if child.is_leaf() => {
                    let used = wiring.async_streams(arg)?;
                    async_uses.insert((inst_id, arg.port.clone()), used);
                }
                ArgCategory::Mmap | ArgCategory::AsyncMmap | ArgCategory::Hmap => {
                    wiring.m_axi(arg, channels)?;
                }
            }
        }

        let connections = wiring.connections;
        debug!(instance = %inst.name, task = %task_name, "child");
        module.add_instance(Cell {
            module: task_name.clone(),
            name: inst.name.clone(),
            params: Vec::new(),
            connections,
        })?;
    }

    for (_, inst) in task.instances.iter() {
        match &inst.kind {
            InstanceKind::Task { .. } => {}
            InstanceKind::AsyncMmap {
                net,
                user,
                port,
                width,
            } => {
                let used = async_uses.get(&(*user, port.clone())).ok_or_else(|| {
                    GraphConsistencyError::MissingChildPort {
                        instance: task.instances[*user].name.clone(),
                        port: port.clone(),
                    }
                })?;
                let private = task.instances[*user]
                    .arg(port)
                    .is_some_and(|a| a.shared);
                emit_demux(
                    &mut module,
                    &DemuxSpec {
                        name: &inst.name,
                        net,
                        tags: &used.tags,
                        width: *width,
                        offset: &used.offset,
                        private,
                    },
                )?;
            }
            InstanceKind::Arbiter { arg, width, users } => {
                let users: Vec<ArbiterUser> = users
                    .iter()
                    .map(|u| ArbiterUser {
                        net: u.net.clone(),
                        id_width: user_ids
                            .iter()
                            .find(|(_, net, _)| *net == u.net)
                            .map_or(BASE_ID_WIDTH, |&(_, _, w)| w),
                    })
                    .collect();
                emit_arbiter(&mut module, &inst.name, arg, *width, &users)?;
            }
        }
    }

    emit_task_fsm(&mut module, level, &is_done)?;
    info!(
        task = %task.name,
        instances = task.instances.len(),
        fifos = task.interconnects.len(),
        "assembled"
    );
    Ok(module)
}

/// `(parent memory, user net, master ID width)` for every memory user.
///
/// Async leaf users sit behind a demultiplexer with a single-ID master;
/// everyone else exposes their own M-AXI ID.
fn master_id_widths(
    graph: &TaskGraph,
    task: &Task,
    interfaces: &InterfaceTable,
) -> Result<Vec<(String, String, u32)>, AssembleError> {
    let mut out = Vec::new();
    for (_, inst) in task.instances.iter() {
        let Some(child_id) = inst.task() else {
            continue;
        };
        let child = &graph[child_id];
        let iface = interfaces
            .get(child_id)
            .ok_or_else(|| AssembleError::MissingInterface {
                task: child.name.clone(),
            })?;
        for arg in inst.args.iter().filter(|a| a.category.is_mmap()) {
            let net = arg.net(&inst.name);
            let id = if arg.category == ArgCategory::AsyncMmap && child.is_leaf() {
                BASE_ID_WIDTH
            } else {
                iface
                    .find_port(&format!("{}ARID", m_axi_prefix(&arg.port)))
                    .map_or(BASE_ID_WIDTH, |p| p.width)
            };
            out.push((arg.name.clone(), net, id));
        }
    }
    Ok(out)
}

/// Connections for one child instance under construction.
struct Wiring<'a> {
    module: &'a mut Module,
    iface: &'a Module,
    child: &'a Task,
    inst: &'a Instance,
    level: u32,
    connections: Vec<Connection>,
}

impl Wiring<'_> {
    fn missing(&self, port: &str) -> GraphConsistencyError {
        GraphConsistencyError::MissingChildPort {
            instance: self.inst.name.clone(),
            port: port.to_string(),
        }
    }

    fn require(&self, port: &str) -> Result<u32, GraphConsistencyError> {
        self.iface
            .find_port(port)
            .map(|p| p.width)
            .ok_or_else(|| self.missing(port))
    }

    /// Like [`Self::require`], but the compiled width must be `expected`.
    fn require_width(&self, port: &str, expected: u32) -> Result<u32, GraphConsistencyError> {
        let found = self.require(port)?;
        if found != expected {
            return Err(GraphConsistencyError::CompiledWidthMismatch {
                instance: self.inst.name.clone(),
                port: port.to_string(),
                expected,
                found,
            });
        }
        Ok(found)
    }

    /// Width of the child's port `port` as the graph declares it.
    fn graph_width(&self, port: &str) -> Result<u32, GraphConsistencyError> {
        self.child
            .port(port)
            .map(|p| p.width)
            .ok_or_else(|| self.missing(port))
    }

    fn connect(&mut self, port: &str, expr: Expr) -> Result<(), GraphConsistencyError> {
        self.require(port)?;
        self.connections.push(Connection::new(port, expr));
        Ok(())
    }

    /// Delays a scalar by `L` so it arrives with the child's start.
    fn scalar(&mut self, port: &str, width: u32, init: Expr) -> Result<(), AssembleError> {
        self.require_width(port, width)?;
        let q = Pipeline::new(format!("{}__{port}", self.inst.name), self.level, width);
        q.emit(&mut *self.module, init, CLK)?;
        self.connect(port, Expr::ident(q.tail()))?;
        Ok(())
    }

    /// The data port carries the payload plus its end bit; the handshake
    /// ports are one bit each.
    fn stream(&mut self, arg: &Arg, suffixes: &[&str]) -> Result<(), AssembleError> {
        let data_width = stream_width(self.graph_width(&arg.port)?);
        for (i, sfx) in suffixes.iter().enumerate() {
            let port = format!("{}{sfx}", arg.port);
            self.require_width(&port, if i == 0 { data_width } else { 1 })?;
            self.connect(
                &port,
                Expr::ident(format!("{}{sfx}", arg.name)),
            )?;
        }
        Ok(())
    }

    /// Connects every `m_axi_{port}_*` of the child to the same field of the
    /// arg's net, and the offset through a scalar pipeline.
    ///
    /// ID widths depend on the child's own arbiters and are taken as found.
    fn m_axi(&mut self, arg: &Arg, channels: u32) -> Result<(), AssembleError> {
        let data_width = self.graph_width(&arg.port)?;
        let net = arg.net(&self.inst.name);
        let child_channels = mmap_channels(&arg.port, channels);
        let net_channels = mmap_channels(&net, channels);
        let parent_channels = mmap_channels(&arg.name, channels);
        for ((child_ch, net_ch), parent_ch) in
            child_channels.iter().zip(&net_channels).zip(&parent_channels)
        {
            let prefix = m_axi_prefix(child_ch);
            let fields: Vec<(String, u32)> = self
                .iface
                .ports
                .iter()
                .filter_map(|p| {
                    p.name
                        .strip_prefix(&prefix)
                        .map(|field| (field.to_string(), p.width))
                })
                .collect();
            if fields.is_empty() {
                return Err(self.missing(&format!("{prefix}ARADDR")).into());
            }
            for (field, width) in fields {
                if let Some(known) = M_AXI_FIELDS.iter().find(|f| f.suffix() == field) {
                    if known.width != AxiWidth::Id {
                        let expected = known.resolve(data_width, BASE_ID_WIDTH);
                        self.require_width(&format!("{prefix}{field}"), expected)?;
                    }
                }
                let target = format!("{}{field}", m_axi_prefix(net_ch));
                if arg.shared {
                    self.module.add_signal(Signal::wire(target.clone(), width))?;
                }
                self.connect(&format!("{prefix}{field}"), Expr::ident(target))?;
            }
            self.scalar(
                &offset_name(child_ch),
                ADDR_WIDTH,
                Expr::ident(offset_name(parent_ch)),
            )?;
        }
        Ok(())
    }

    /// Wires the tags a leaf uses on its async memory port and prepares the
    /// offset for its demultiplexer.
    fn async_streams(&mut self, arg: &Arg) -> Result<AsyncUse, AssembleError> {
        let data_width = self.graph_width(&arg.port)?;
        let net = arg.net(&self.inst.name);
        let tags: Vec<AsyncTag> = AsyncTag::ALL
            .into_iter()
            .filter(|tag| {
                let first = tag.suffixes()[0];
                self.iface
                    .find_port(&format!("{}{first}", tag.stream(&arg.port)))
                    .is_some()
            })
            .collect();
        if tags.is_empty() {
            let first = AsyncTag::ReadAddr;
            return Err(self
                .missing(&format!("{}{}", first.stream(&arg.port), first.suffixes()[0]))
                .into());
        }
        for tag in &tags {
            let child = tag.stream(&arg.port);
            let wire = tag.stream(&net);
            for (i, sfx) in tag.suffixes().into_iter().enumerate() {
                let expected = if i == 0 { tag.width(data_width) } else { 1 };
                let width = self.require_width(&format!("{child}{sfx}"), expected)?;
                self.module
                    .add_signal(Signal::wire(format!("{wire}{sfx}"), width))?;
                self.connect(&format!("{child}{sfx}"), Expr::ident(format!("{wire}{sfx}")))?;
            }
        }

        let q = Pipeline::new(
            format!("{}__{}", self.inst.name, offset_name(&arg.port)),
            self.level,
            ADDR_WIDTH,
        );
        q.emit(&mut *self.module, Expr::ident(offset_name(&arg.name)), CLK)?;
        Ok(AsyncUse {
            tags,
            offset: q.tail(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::leaf_interface;
    use crate::link::{link, LinkOptions};
    use conflux_netlist::write_verilog;
    use serde_json::json;

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

    fn graph(value: serde_json::Value) -> TaskGraph {
        TaskGraph::from_doc(&serde_json::from_value(value).unwrap()).unwrap()
    }

    fn leaves(graph: &TaskGraph) -> BTreeMap<String, Module> {
        graph
            .leaves()
            .map(|(_, t)| {
                let m = Module::with_ports(t.name.clone(), leaf_interface(&t.ports)).unwrap();
                (t.name.clone(), m)
            })
            .collect()
    }

    fn options(level: u32) -> LinkOptions {
        LinkOptions {
            register_level: level,
            partitions: BTreeMap::new(),
        }
    }

    #[test]
    fn vadd_assembles() {
        let g = graph(vadd());
        let linked = link(&g, &leaves(&g), &options(2)).unwrap();
        let top = &linked.modules["VecAdd"];

        assert_eq!(top.find_port("m_axi_gmem_ARID").map(|p| p.width), Some(2));
        assert_eq!(top.find_port("gmem_offset").map(|p| p.width), Some(64));
        assert_eq!(top.find_port("n").map(|p| p.width), Some(64));

        let load = top.instance("Load_0").unwrap();
        assert_eq!(load.module, "Load");
        assert_eq!(load.connection("n"), Some(&Expr::ident("Load_0__n__q2")));
        assert_eq!(
            load.connection("out_din"),
            Some(&Expr::ident("a_q_din"))
        );
        assert_eq!(
            load.connection("m_axi_mem_ARADDR"),
            Some(&Expr::ident("m_axi_gmem___Load_0___mem_ARADDR"))
        );
        assert_eq!(top.instance("a_q").map(|i| i.module.as_str()), Some("fifo"));
        assert_eq!(
            top.instance("gmem__arbiter").map(|i| i.module.as_str()),
            Some("axi_crossbar_2x1")
        );

        let text = write_verilog(top);
        assert!(text.contains("assign Load_0__mem_offset__q0 = gmem_offset;"));
        assert!(text.contains("module VecAdd"));
    }

    #[test]
    fn output_is_deterministic() {
        let g = graph(vadd());
        let a = link(&g, &leaves(&g), &options(3)).unwrap();
        let b = link(&g, &leaves(&g), &options(3)).unwrap();
        assert_eq!(
            write_verilog(&a.modules["VecAdd"]),
            write_verilog(&b.modules["VecAdd"])
        );
    }

    #[test]
    fn missing_offset_port_is_named() {
        let g = graph(vadd());
        let mut leaves = leaves(&g);
        let store = leaves.get_mut("Store").unwrap();
        store.remove_port("mem_offset").unwrap();

        let err = link(&g, &leaves, &options(2)).unwrap_err();
        assert_eq!(
            err,
            AssembleError::Graph(GraphConsistencyError::MissingChildPort {
                instance: "Store_0".to_string(),
                port: "mem_offset".to_string(),
            })
        );
    }

    #[test]
    fn narrowed_compiled_ports_are_rejected() {
        let g = graph(vadd());
        let mut narrowed = leaves(&g);
        let add = narrowed.get_mut("Add").unwrap();
        add.remove_port("a_dout").unwrap();
        add.add_port(conflux_netlist::Port::input("a_dout", 8)).unwrap();
        let err = link(&g, &narrowed, &options(2)).unwrap_err();
        assert_eq!(
            err,
            AssembleError::Graph(GraphConsistencyError::CompiledWidthMismatch {
                instance: "Add_0".to_string(),
                port: "a_dout".to_string(),
                expected: 33,
                found: 8,
            })
        );

        let mut narrowed = leaves(&g);
        let load = narrowed.get_mut("Load").unwrap();
        load.remove_port("n").unwrap();
        load.add_port(conflux_netlist::Port::input("n", 8)).unwrap();
        let err = link(&g, &narrowed, &options(2)).unwrap_err();
        assert_eq!(
            err,
            AssembleError::Graph(GraphConsistencyError::CompiledWidthMismatch {
                instance: "Load_0".to_string(),
                port: "n".to_string(),
                expected: 64,
                found: 8,
            })
        );
    }

    #[test]
    fn narrowed_memory_data_is_rejected() {
        let g = graph(vadd());
        let mut narrowed = leaves(&g);
        let store = narrowed.get_mut("Store").unwrap();
        store.remove_port("m_axi_mem_WDATA").unwrap();
        store
            .add_port(conflux_netlist::Port::output("m_axi_mem_WDATA", 16))
            .unwrap();
        let err = link(&g, &narrowed, &options(2)).unwrap_err();
        assert!(matches!(
            err,
            AssembleError::Graph(GraphConsistencyError::CompiledWidthMismatch {
                ref port,
                expected: 32,
                found: 16,
                ..
            }) if port == "m_axi_mem_WDATA"
        ));
    }

    #[test]
    fn missing_leaf_interface() {
        let g = graph(vadd());
        let mut leaves = leaves(&g);
        leaves.remove("Add");
        let err = link(&g, &leaves, &options(2)).unwrap_err();
        assert_eq!(
            err,
            AssembleError::MissingInterface {
                task: "Add".to_string()
            }
        );
    }

    #[test]
    fn async_leaf_gets_demux_behind_arbiter() {
        let mut v = vadd();
        v["tasks"]["Store"]["ports"][1]["category"] = json!("async_mmap");
        v["tasks"]["VecAdd"]["instances"]["Store"][0]["args"]["mem"]["category"] =
            json!("async_mmap");
        let g = graph(v);
        let linked = link(&g, &leaves(&g), &options(2)).unwrap();
        let top = &linked.modules["VecAdd"];

        let store = top.instance("Store_0").unwrap();
        assert_eq!(
            store.connection("mem_read_addr_din"),
            Some(&Expr::ident("gmem___Store_0___mem_read_addr_din"))
        );
        assert!(store.connection("m_axi_mem_ARADDR").is_none());

        let demux = top.instance("gmem___Store_0___mem__async_mmap").unwrap();
        assert_eq!(
            demux.connection("offset"),
            Some(&Expr::ident("Store_0__mem_offset__q2"))
        );
        assert!(top.signal("m_axi_gmem___Store_0___mem_AWADDR").is_some());
        let arbiter = top.instance("gmem__arbiter").unwrap();
        assert!(arbiter.connection("s01_axi_awaddr").is_some());
    }

    #[test]
    fn zero_level_wires_scalars_straight_through() {
        let g = graph(vadd());
        let linked = link(&g, &leaves(&g), &options(0)).unwrap();
        let top = &linked.modules["VecAdd"];
        let load = top.instance("Load_0").unwrap();
        assert_eq!(load.connection("n"), Some(&Expr::ident("Load_0__n__q0")));
    }
}
