//! Resource areas and the structural overhead of upper tasks.

use conflux_common::{addr_width, bit_length};
use conflux_graph::{InstanceKind, Task};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Device resources used by one module.
///
/// `bram` counts 18 Kb blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    /// Block RAM, in 18 Kb units.
    pub bram: u64,
    /// DSP slices.
    pub dsp: u64,
    /// Flip-flops.
    pub ff: u64,
    /// Lookup tables.
    pub lut: u64,
    /// UltraRAM blocks.
    pub uram: u64,
}

impl Area {
    /// No resources.
    pub const ZERO: Area = Area {
        bram: 0,
        dsp: 0,
        ff: 0,
        lut: 0,
        uram: 0,
    };

    /// `count` copies of this area.
    pub fn times(self, count: u64) -> Area {
        Area {
            bram: self.bram * count,
            dsp: self.dsp * count,
            ff: self.ff * count,
            lut: self.lut * count,
            uram: self.uram * count,
        }
    }

    fn logic(ff: u64, lut: u64) -> Area {
        Area {
            ff,
            lut,
            ..Area::ZERO
        }
    }
}

impl Add for Area {
    type Output = Area;

    fn add(self, rhs: Area) -> Area {
        Area {
            bram: self.bram + rhs.bram,
            dsp: self.dsp + rhs.dsp,
            ff: self.ff + rhs.ff,
            lut: self.lut + rhs.lut,
            uram: self.uram + rhs.uram,
        }
    }
}

impl AddAssign for Area {
    fn add_assign(&mut self, rhs: Area) {
        *self = *self + rhs;
    }
}

impl Sum for Area {
    fn sum<I: Iterator<Item = Area>>(iter: I) -> Area {
        iter.fold(Area::ZERO, Add::add)
    }
}

/// Measured area of an async memory demultiplexer, by data width rounded up
/// to a power of two.
pub fn async_mmap_area(data_width: u32) -> Area {
    let (ff, lut) = match data_width.max(1).next_power_of_two() {
        0..=32 => (377, 786),
        64 => (375, 848),
        128 => (373, 971),
        256 => (371, 1225),
        512 => (369, 1735),
        _ => (367, 2755),
    };
    Area::logic(ff, lut)
}

/// Coarse area of an AXI crossbar merging `users` masters.
pub fn arbiter_area(users: usize) -> Area {
    let users = users as u64;
    Area::logic(400 * users, 300 * users)
}

/// Bits per 18 Kb block RAM.
const BRAM_BITS: u64 = 18 * 1024;

/// FIFOs up to this depth map to shift-register LUTs.
const SRL_DEPTH: u32 = 32;

/// Area of one FIFO carrying `width` payload bits.
pub fn fifo_area(width: u32, depth: u32) -> Area {
    let data = u64::from(width) + 1;
    let control = 2 * u64::from(addr_width(depth));
    if depth <= SRL_DEPTH {
        Area::logic(data + control, data + control)
    } else {
        Area {
            bram: (data * u64::from(depth)).div_ceil(BRAM_BITS),
            ..Area::logic(data + control, control)
        }
    }
}

/// Registers added by a relay chain of `partitions` stages.
pub fn relay_area(width: u32, partitions: u32) -> Area {
    let data = u64::from(width) + 1;
    Area::logic(2 * data * u64::from(partitions), data * u64::from(partitions))
}

/// Estimated area of the logic an upper task adds around its children:
/// FIFOs, relay chains, controllers, delay pipelines, demultiplexers and
/// arbiters.
pub fn estimate_overhead(task: &Task, level: u32, partitions: &BTreeMap<String, u32>) -> Area {
    let level = u64::from(level);
    let mut area = Area::ZERO;

    for ic in &task.interconnects {
        let Some(depth) = ic.depth else { continue };
        area += fifo_area(ic.width, depth);
        if let Some(&p) = partitions.get(&ic.name).filter(|&&p| p > 1) {
            area += relay_area(ic.width, p);
        }
    }

    for (_, inst) in task.instances.iter() {
        area += match &inst.kind {
            InstanceKind::Task { .. } if inst.is_autorun() => Area::logic(1 + 2 * level, 1),
            // State register, start and done pipelines, plus one pipeline
            // per argument.
            InstanceKind::Task { .. } => {
                Area::logic(2 + (2 + inst.args.len() as u64) * level, 6)
            }
            InstanceKind::AsyncMmap { width, .. } => async_mmap_area(*width),
            InstanceKind::Arbiter { users, .. } => arbiter_area(users.len()),
        };
    }

    let countdown = u64::from(bit_length(level.saturating_sub(1)).max(1));
    area + Area::logic(2 + countdown + level, 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_arithmetic() {
        let a = Area {
            bram: 1,
            dsp: 2,
            ff: 3,
            lut: 4,
            uram: 0,
        };
        assert_eq!((a + a).ff, 6);
        assert_eq!(a.times(3).lut, 12);
        let total: Area = vec![a, a, Area::ZERO].into_iter().sum();
        assert_eq!(total, a.times(2));
    }

    #[test]
    fn demux_area_by_width() {
        assert_eq!(async_mmap_area(32).lut, 786);
        assert_eq!(async_mmap_area(33).lut, 848);
        assert_eq!(async_mmap_area(512).ff, 369);
        assert_eq!(async_mmap_area(4096).lut, 2755);
        assert_eq!(async_mmap_area(8).lut, 786);
    }

    #[test]
    fn deep_fifo_uses_bram() {
        assert_eq!(fifo_area(32, 8).bram, 0);
        assert_eq!(fifo_area(511, 1024).bram, 29);
        assert!(fifo_area(32, 8).lut > 0);
    }

    #[test]
    fn serde_field_names() {
        let json = serde_json::to_string(&Area::ZERO).unwrap();
        assert_eq!(json, r#"{"bram":0,"dsp":0,"ff":0,"lut":0,"uram":0}"#);
    }
}
