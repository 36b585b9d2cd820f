//! Port naming conventions shared by leaf interfaces and assembled modules.

use conflux_netlist::{Port, PortDirection};

/// Width of memory offsets and async-memory address channels.
pub const ADDR_WIDTH: u32 = 64;

/// Width of the async-memory write response channel.
pub const WRITE_RESP_WIDTH: u32 = 8;

/// ID width of a single, unarbitrated M-AXI master.
pub const BASE_ID_WIDTH: u32 = 1;

/// Suffixes of a consumer's stream ports, in declaration order.
pub const ISTREAM_SUFFIXES: [&str; 3] = ["_dout", "_empty_n", "_read"];

/// Suffixes of a producer's stream ports, in declaration order.
pub const OSTREAM_SUFFIXES: [&str; 3] = ["_din", "_full_n", "_write"];

/// Consumer side of a stream whose payload is `data_width` bits.
pub fn read_ports(name: &str, data_width: u32) -> Vec<Port> {
    vec![
        Port::input(format!("{name}_dout"), data_width),
        Port::input(format!("{name}_empty_n"), 1),
        Port::output(format!("{name}_read"), 1),
    ]
}

/// Producer side of a stream whose payload is `data_width` bits.
pub fn write_ports(name: &str, data_width: u32) -> Vec<Port> {
    vec![
        Port::output(format!("{name}_din"), data_width),
        Port::input(format!("{name}_full_n"), 1),
        Port::output(format!("{name}_write"), 1),
    ]
}

/// Stream payload width: the element plus an end-of-transaction bit.
pub fn stream_width(width: u32) -> u32 {
    width + 1
}

/// Scalar port carrying the base address of memory `name`.
pub fn offset_name(name: &str) -> String {
    format!("{name}_offset")
}

/// How wide one M-AXI field is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxiWidth {
    /// A fixed width.
    Fixed(u32),
    /// The address width.
    Addr,
    /// The data width.
    Data,
    /// One strobe bit per data byte.
    Strb,
    /// The transaction ID width.
    Id,
}

/// One field of an M-AXI channel, seen from the master.
#[derive(Clone, Copy, Debug)]
pub struct AxiField {
    /// Channel: `AR`, `AW`, `B`, `R` or `W`.
    pub channel: &'static str,
    /// Field name within the channel.
    pub field: &'static str,
    /// Field width.
    pub width: AxiWidth,
    /// Direction at the master.
    pub direction: PortDirection,
}

const fn out(channel: &'static str, field: &'static str, width: AxiWidth) -> AxiField {
    AxiField {
        channel,
        field,
        width,
        direction: PortDirection::Output,
    }
}

const fn inp(channel: &'static str, field: &'static str, width: AxiWidth) -> AxiField {
    AxiField {
        channel,
        field,
        width,
        direction: PortDirection::Input,
    }
}

/// Every M-AXI field in declaration order.
pub const M_AXI_FIELDS: &[AxiField] = &[
    out("AR", "ADDR", AxiWidth::Addr),
    out("AR", "BURST", AxiWidth::Fixed(2)),
    out("AR", "CACHE", AxiWidth::Fixed(4)),
    out("AR", "ID", AxiWidth::Id),
    out("AR", "LEN", AxiWidth::Fixed(8)),
    out("AR", "LOCK", AxiWidth::Fixed(1)),
    out("AR", "PROT", AxiWidth::Fixed(3)),
    out("AR", "QOS", AxiWidth::Fixed(4)),
    inp("AR", "READY", AxiWidth::Fixed(1)),
    out("AR", "SIZE", AxiWidth::Fixed(3)),
    out("AR", "VALID", AxiWidth::Fixed(1)),
    out("AW", "ADDR", AxiWidth::Addr),
    out("AW", "BURST", AxiWidth::Fixed(2)),
    out("AW", "CACHE", AxiWidth::Fixed(4)),
    out("AW", "ID", AxiWidth::Id),
    out("AW", "LEN", AxiWidth::Fixed(8)),
    out("AW", "LOCK", AxiWidth::Fixed(1)),
    out("AW", "PROT", AxiWidth::Fixed(3)),
    out("AW", "QOS", AxiWidth::Fixed(4)),
    inp("AW", "READY", AxiWidth::Fixed(1)),
    out("AW", "SIZE", AxiWidth::Fixed(3)),
    out("AW", "VALID", AxiWidth::Fixed(1)),
    inp("B", "ID", AxiWidth::Id),
    out("B", "READY", AxiWidth::Fixed(1)),
    inp("B", "RESP", AxiWidth::Fixed(2)),
    inp("B", "VALID", AxiWidth::Fixed(1)),
    inp("R", "DATA", AxiWidth::Data),
    inp("R", "ID", AxiWidth::Id),
    inp("R", "LAST", AxiWidth::Fixed(1)),
    out("R", "READY", AxiWidth::Fixed(1)),
    inp("R", "RESP", AxiWidth::Fixed(2)),
    inp("R", "VALID", AxiWidth::Fixed(1)),
    out("W", "DATA", AxiWidth::Data),
    out("W", "LAST", AxiWidth::Fixed(1)),
    inp("W", "READY", AxiWidth::Fixed(1)),
    out("W", "STRB", AxiWidth::Strb),
    out("W", "VALID", AxiWidth::Fixed(1)),
];

impl AxiField {
    /// `{CH}{FIELD}`, e.g. `ARADDR`.
    pub fn suffix(&self) -> String {
        format!("{}{}", self.channel, self.field)
    }

    /// Resolved width for a given data and ID width.
    pub fn resolve(&self, data_width: u32, id_width: u32) -> u32 {
        match self.width {
            AxiWidth::Fixed(w) => w,
            AxiWidth::Addr => ADDR_WIDTH,
            AxiWidth::Data => data_width,
            AxiWidth::Strb => (data_width / 8).max(1),
            AxiWidth::Id => id_width,
        }
    }
}

/// Prefix of every M-AXI port of memory `name`.
pub fn m_axi_prefix(name: &str) -> String {
    format!("m_axi_{name}_")
}

/// Full M-AXI master interface of memory `name`.
pub fn m_axi_ports(name: &str, data_width: u32, id_width: u32) -> Vec<Port> {
    let prefix = m_axi_prefix(name);
    M_AXI_FIELDS
        .iter()
        .map(|f| Port {
            name: format!("{prefix}{}", f.suffix()),
            direction: f.direction,
            width: f.resolve(data_width, id_width),
        })
        .collect()
}

/// Names of the memory channels behind one port: the port itself, or one
/// per bank for banked memories.
pub fn mmap_channels(name: &str, channels: u32) -> Vec<String> {
    if channels <= 1 {
        vec![name.to_string()]
    } else {
        (0..channels).map(|i| format!("{name}_{i}")).collect()
    }
}

/// One sub-interface of an asynchronous memory port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AsyncTag {
    /// Read requests from the user.
    ReadAddr,
    /// Read responses to the user.
    ReadData,
    /// Write requests from the user.
    WriteAddr,
    /// Write payloads from the user.
    WriteData,
    /// Write acknowledgements to the user.
    WriteResp,
}

impl AsyncTag {
    /// Every tag, in declaration order.
    pub const ALL: [AsyncTag; 5] = [
        AsyncTag::ReadAddr,
        AsyncTag::ReadData,
        AsyncTag::WriteAddr,
        AsyncTag::WriteData,
        AsyncTag::WriteResp,
    ];

    /// The tag as it appears in port names.
    pub fn name(self) -> &'static str {
        match self {
            AsyncTag::ReadAddr => "read_addr",
            AsyncTag::ReadData => "read_data",
            AsyncTag::WriteAddr => "write_addr",
            AsyncTag::WriteData => "write_data",
            AsyncTag::WriteResp => "write_resp",
        }
    }

    /// Whether the user consumes this stream.
    pub fn to_user(self) -> bool {
        matches!(self, AsyncTag::ReadData | AsyncTag::WriteResp)
    }

    /// Payload width for a memory of `data_width` bits.
    pub fn width(self, data_width: u32) -> u32 {
        match self {
            AsyncTag::ReadAddr | AsyncTag::WriteAddr => ADDR_WIDTH,
            AsyncTag::ReadData | AsyncTag::WriteData => data_width,
            AsyncTag::WriteResp => WRITE_RESP_WIDTH,
        }
    }

    /// Stream suffixes as seen by the user.
    pub fn suffixes(self) -> [&'static str; 3] {
        if self.to_user() {
            ISTREAM_SUFFIXES
        } else {
            OSTREAM_SUFFIXES
        }
    }

    /// `{base}_{tag}`.
    pub fn stream(self, base: &str) -> String {
        format!("{base}_{}", self.name())
    }

    /// The user's ports for this tag on memory port `port`.
    pub fn user_ports(self, port: &str, data_width: u32) -> Vec<Port> {
        let stream = self.stream(port);
        if self.to_user() {
            read_ports(&stream, self.width(data_width))
        } else {
            write_ports(&stream, self.width(data_width))
        }
    }
}
