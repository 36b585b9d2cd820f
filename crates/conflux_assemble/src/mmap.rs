//! Memory-mapped argument plumbing: M-AXI passthrough, async demultiplexers
//! and shared-memory arbiters.

use crate::naming::{m_axi_ports, AsyncTag, ADDR_WIDTH, BASE_ID_WIDTH, M_AXI_FIELDS};
use conflux_common::bit_length;
use conflux_fsm::{CLK, RST_N};
use conflux_netlist::{Expr, Instance, ModuleEditor, NetlistError, Parameter, Signal};
use tracing::debug;

/// Library module converting tagged async streams to one M-AXI master.
pub const ASYNC_MMAP_MODULE: &str = "async_mmap";

/// Library module name of an `n`-to-one AXI crossbar.
pub fn arbiter_module(users: usize) -> String {
    format!("axi_crossbar_{users}x1")
}

/// ID width at the master side of an arbiter merging `user_ids`.
pub fn arbiter_id_width(user_ids: &[u32]) -> u32 {
    let base = user_ids.iter().copied().max().unwrap_or(BASE_ID_WIDTH);
    base + bit_length(user_ids.len().saturating_sub(1) as u64)
}

/// An async-memory user as seen by its demultiplexer.
#[derive(Clone, Debug)]
pub struct DemuxSpec<'a> {
    /// Instance name of the demultiplexer.
    pub name: &'a str,
    /// Net carrying the user's streams and the M-AXI side.
    pub net: &'a str,
    /// Tags the user actually uses.
    pub tags: &'a [AsyncTag],
    /// Memory data width.
    pub width: u32,
    /// Delayed base address.
    pub offset: &'a str,
    /// Whether the M-AXI side is a private net feeding an arbiter.
    pub private: bool,
}

/// Emits one async-memory demultiplexer.
///
/// Unused tags are tied off so the demultiplexer never sees a request on
/// them and never delivers a response.
pub fn emit_demux(editor: &mut impl ModuleEditor, spec: &DemuxSpec<'_>) -> Result<(), NetlistError> {
    debug!(demux = spec.name, tags = spec.tags.len(), "async mmap");
    let mut inst = Instance::new(ASYNC_MMAP_MODULE, spec.name)
        .with_param(Parameter::int("DATA_WIDTH", u64::from(spec.width)))
        .with_param(Parameter::int("ADDR_WIDTH", u64::from(ADDR_WIDTH)))
        .connect("clk", CLK)
        .connect("reset", Expr::ident(RST_N).not())
        .connect("offset", spec.offset);

    for tag in AsyncTag::ALL {
        let stream = tag.stream(spec.net);
        if spec.tags.contains(&tag) {
            for sfx in tag.suffixes() {
                inst = inst.connect(format!("{}{sfx}", tag.name()), format!("{stream}{sfx}"));
            }
        } else if tag.to_user() {
            inst = inst.connect(format!("{}_read", tag.name()), Expr::low());
        } else {
            inst = inst
                .connect(
                    format!("{}_din", tag.name()),
                    Expr::constant(tag.width(spec.width), 0),
                )
                .connect(format!("{}_write", tag.name()), Expr::low());
        }
    }

    let masters = m_axi_ports(spec.net, spec.width, BASE_ID_WIDTH);
    for (field, port) in M_AXI_FIELDS.iter().zip(&masters) {
        inst = inst.connect(format!("m_axi_{}", field.suffix()), port.name.clone());
    }
    if spec.private {
        for port in masters {
            editor.add_signal(Signal::wire(port.name, port.width))?;
        }
    }
    editor.add_instance(inst)
}

/// One master merged by an arbiter.
#[derive(Clone, Debug)]
pub struct ArbiterUser {
    /// Private net of the user.
    pub net: String,
    /// ID width of the user's master.
    pub id_width: u32,
}

/// Emits the crossbar merging every user of shared memory `arg` onto the
/// boundary master of the same name.
pub fn emit_arbiter(
    editor: &mut impl ModuleEditor,
    name: &str,
    arg: &str,
    width: u32,
    users: &[ArbiterUser],
) -> Result<(), NetlistError> {
    let ids: Vec<u32> = users.iter().map(|u| u.id_width).collect();
    let s_id = ids.iter().copied().max().unwrap_or(BASE_ID_WIDTH);
    let m_id = arbiter_id_width(&ids);
    debug!(arbiter = name, users = users.len(), m_id, "shared mmap");

    let mut inst = Instance::new(arbiter_module(users.len()), name)
        .with_param(Parameter::int("DATA_WIDTH", u64::from(width)))
        .with_param(Parameter::int("ADDR_WIDTH", u64::from(ADDR_WIDTH)))
        .with_param(Parameter::int("S_ID_WIDTH", u64::from(s_id)))
        .with_param(Parameter::int("M_ID_WIDTH", u64::from(m_id)))
        .connect("clk", CLK)
        .connect("rst", Expr::ident(RST_N).not());

    for (i, user) in users.iter().enumerate() {
        for field in M_AXI_FIELDS {
            let net = format!("m_axi_{}_{}", user.net, field.suffix());
            if editor.has_net(&net) {
                let port = format!("s{i:02}_axi_{}", field.suffix().to_lowercase());
                inst = inst.connect(port, net);
            }
        }
    }
    for field in M_AXI_FIELDS {
        let net = format!("m_axi_{arg}_{}", field.suffix());
        if editor.has_net(&net) {
            inst = inst.connect(format!("m00_axi_{}", field.suffix().to_lowercase()), net);
        }
    }
    editor.add_instance(inst)
}
