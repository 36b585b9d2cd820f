//! Buffered interconnects.

use crate::naming::{read_ports, stream_width, write_ports};
use conflux_common::addr_width;
use conflux_fsm::{CLK, RST_N};
use conflux_graph::Interconnect;
use conflux_netlist::{Expr, Instance, ModuleEditor, NetlistError, Parameter, Signal};
use tracing::debug;

/// Library module for a single-region FIFO.
pub const FIFO_MODULE: &str = "fifo";

/// Library module for a FIFO split into chained, separately placed stages.
pub const RELAY_MODULE: &str = "relay_station";

/// Emits the buffer for `ic` and the wires both endpoints attach to.
///
/// Pass-through interconnects emit nothing: their endpoint connects straight
/// to the boundary port of the same name. A partition count above one
/// replaces the FIFO with a relay chain of that many stages.
pub fn emit_interconnect(
    editor: &mut impl ModuleEditor,
    ic: &Interconnect,
    partitions: u32,
) -> Result<(), NetlistError> {
    let Some(depth) = ic.depth else {
        debug!(fifo = %ic.name, "pass-through");
        return Ok(());
    };

    let width = stream_width(ic.width);
    for port in write_ports(&ic.name, width)
        .into_iter()
        .chain(read_ports(&ic.name, width))
    {
        editor.add_signal(Signal::wire(port.name, port.width))?;
    }

    let module = if partitions > 1 { RELAY_MODULE } else { FIFO_MODULE };
    debug!(fifo = %ic.name, depth, width, partitions, module, "buffer");
    let mut inst = Instance::new(module, ic.name.clone())
        .with_param(Parameter::int("DATA_WIDTH", u64::from(width)))
        .with_param(Parameter::int("ADDR_WIDTH", u64::from(addr_width(depth))))
        .with_param(Parameter::int("DEPTH", u64::from(depth)));
    if partitions > 1 {
        inst = inst.with_param(Parameter::int("LEVEL", u64::from(partitions)));
    }
    let name = &ic.name;
    let inst = inst
        .connect("clk", CLK)
        .connect("reset", Expr::ident(RST_N).not())
        .connect("if_full_n", format!("{name}_full_n"))
        .connect("if_write_ce", Expr::high())
        .connect("if_write", format!("{name}_write"))
        .connect("if_din", format!("{name}_din"))
        .connect("if_empty_n", format!("{name}_empty_n"))
        .connect("if_read_ce", Expr::high())
        .connect("if_read", format!("{name}_read"))
        .connect("if_dout", format!("{name}_dout"));
    editor.add_instance(inst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use conflux_graph::{ArenaId, InstanceId};
    use conflux_netlist::Module;

    fn ic(depth: Option<u32>) -> Interconnect {
        Interconnect {
            name: "a_q".to_string(),
            depth,
            producer: Some(InstanceId::from_raw(0)),
            consumer: depth.map(|_| InstanceId::from_raw(1)),
            width: 32,
        }
    }

    #[test]
    fn fifo_sized_from_width_and_depth() {
        let mut m = Module::new("Top");
        emit_interconnect(&mut m, &ic(Some(8)), 1).unwrap();
        let inst = m.instance("a_q").unwrap();
        assert_eq!(inst.module, FIFO_MODULE);
        let params: Vec<(&str, &Expr)> =
            inst.params.iter().map(|p| (p.name.as_str(), &p.value)).collect();
        assert_eq!(
            params,
            vec![
                ("DATA_WIDTH", &Expr::constant(0, 33)),
                ("ADDR_WIDTH", &Expr::constant(0, 3)),
                ("DEPTH", &Expr::constant(0, 8)),
            ]
        );
        assert_eq!(m.signal("a_q_dout").map(|s| s.width), Some(33));
        assert_eq!(m.signal("a_q_read").map(|s| s.width), Some(1));
    }

    #[test]
    fn depth_one_still_has_an_address_bit() {
        let mut m = Module::new("Top");
        emit_interconnect(&mut m, &ic(Some(1)), 1).unwrap();
        let inst = m.instance("a_q").unwrap();
        assert_eq!(inst.params[1].value, Expr::constant(0, 1));
    }

    #[test]
    fn partitioned_fifo_becomes_relay_chain() {
        let mut m = Module::new("Top");
        emit_interconnect(&mut m, &ic(Some(8)), 3).unwrap();
        let inst = m.instance("a_q").unwrap();
        assert_eq!(inst.module, RELAY_MODULE);
        assert_eq!(inst.params.last().map(|p| &p.value), Some(&Expr::constant(0, 3)));
    }

    #[test]
    fn pass_through_emits_nothing() {
        let mut m = Module::new("Top");
        emit_interconnect(&mut m, &ic(None), 1).unwrap();
        assert!(m.instances.is_empty());
        assert!(m.signals.is_empty());
    }
}
