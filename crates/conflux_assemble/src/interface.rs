//! Module interfaces derived from a task's declared ports.

use crate::naming::{
    m_axi_ports, mmap_channels, offset_name, read_ports, stream_width, write_ports, ADDR_WIDTH,
    BASE_ID_WIDTH,
};
use conflux_fsm::{CLK, DONE, IDLE, READY, RST_N, START};
use conflux_graph::ArgCategory;
use conflux_netlist::Port;

/// `ap_clk`, `ap_rst_n`, `ap_start`, `ap_done`, `ap_idle`, `ap_ready`.
pub fn handshake_ports() -> Vec<Port> {
    vec![
        Port::input(CLK, 1),
        Port::input(RST_N, 1),
        Port::input(START, 1),
        Port::output(DONE, 1),
        Port::output(IDLE, 1),
        Port::output(READY, 1),
    ]
}

/// Module ports implementing one task port.
///
/// Memories become an M-AXI master plus a 64-bit offset per channel; async
/// memories are M-AXI too at this level because the demultiplexer lives in
/// the parent of the leaf that uses them.
pub fn ports_for(port: &conflux_graph::Port, id_width: u32) -> Vec<Port> {
    match port.category {
        ArgCategory::Scalar => vec![Port::input(port.name.clone(), port.width)],
        ArgCategory::Istream => read_ports(&port.name, stream_width(port.width)),
        ArgCategory::Ostream => write_ports(&port.name, stream_width(port.width)),
        ArgCategory::Mmap | ArgCategory::AsyncMmap | ArgCategory::Hmap => {
            mmap_channels(&port.name, port.channels())
                .iter()
                .flat_map(|ch| {
                    let mut ports = m_axi_ports(ch, port.width, id_width);
                    ports.push(Port::input(offset_name(ch), ADDR_WIDTH));
                    ports
                })
                .collect()
        }
    }
}

/// The interface a leaf synthesizer is expected to produce for `ports`.
///
/// Async memory ports of a leaf are exposed as their tagged streams rather
/// than M-AXI, one set per tag.
pub fn leaf_interface(ports: &[conflux_graph::Port]) -> Vec<Port> {
    let mut out = handshake_ports();
    for port in ports {
        if port.category == ArgCategory::AsyncMmap {
            out.extend(
                crate::naming::AsyncTag::ALL
                    .iter()
                    .flat_map(|tag| tag.user_ports(&port.name, port.width)),
            );
        } else {
            out.extend(ports_for(port, BASE_ID_WIDTH));
        }
    }
    out
}
