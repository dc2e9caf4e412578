use super::*;

/// the cumulative time a cpu has spent in each state since boot, from one `cpu` row.
///
/// fields appear in the order the kernel prints them. see `proc_stat(5)`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CpuTime {
    user: UserHz,
    /// user mode, at low priority.
    nice: UserHz,
    system: UserHz,
    /// the idle task.
    idle: UserHz,
    /// waiting on i/o, counted as idle. the kernel does not promise this one is monotonic.
    iowait: UserHz,
    irq: UserHz,
    softirq: UserHz,
    /// time taken by the hypervisor for other guests.
    steal: UserHz,
    /// running guests of our own. already included in `user`.
    guest: UserHz,
    /// already included in `nice`.
    guest_nice: UserHz,
}

/// a measurement of the difference between two [`CpuTime`]s.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Measurement {
    /// how the cpu spent the time between the two readings.
    elapsed: CpuTime,
}

// === impl Measurement ===

impl Measurement {
    /// measures how the cpu spent its time between `a` and `b`.
    ///
    /// counters that moved backwards (iowait may) count as zero.
    pub fn new(a: &CpuTime, b: &CpuTime) -> Self {
        let a: [UserHz; CpuTime::FIELDS] = a.clone().into();
        let b: [UserHz; CpuTime::FIELDS] = b.clone().into();
        let elapsed = std::array::from_fn(|i| b[i] - a[i]);

        Self {
            elapsed: CpuTime::from(elapsed),
        }
    }

    /// returns the percentage of active cpu time, rounded to one decimal place.
    ///
    /// an interval in which no time elapsed at all reports an idle cpu.
    pub fn percentage(&self) -> f64 {
        let Self { elapsed } = self;
        let total = elapsed.total();
        if total == UserHz::ZERO {
            return 0.0;
        }

        // calculate a percentage.
        let percent = (elapsed.active() / total) * 100.0;
        debug_assert!((0.0..=100.0).contains(&percent));

        // round to the nearest tenth of a percentage point.
        (percent * 10.0).round() / 10.0
    }
}

// === impl CpuTime ===

impl CpuTime {
    /// the number of time fields in a `cpu` row of `/proc/stat`.
    pub const FIELDS: usize = 10;

    /// time spent doing work.
    pub fn active(&self) -> UserHz {
        let Self {
            user,
            nice,
            system,
            irq,
            softirq,
            steal,
            ..
        } = *self;

        user + nice + system + irq + softirq + steal
    }

    /// time spent waiting, either idle or blocked on i/o.
    pub fn idle(&self) -> UserHz {
        self.idle + self.iowait
    }

    /// all of the time accounted for.
    ///
    /// the kernel already counts `guest` inside `user`, and `guest_nice` inside `nice`, so neither
    /// is added again here.
    pub fn total(&self) -> UserHz {
        self.active() + self.idle()
    }
}

impl TryFrom<Vec<UserHz>> for CpuTime {
    type Error = EntryParseError;
    fn try_from(times: Vec<UserHz>) -> Result<Self, Self::Error> {
        let len = times.len();
        <_ as TryInto<[_; Self::FIELDS]>>::try_into(times)
            .map(Self::from)
            .map_err(|_| EntryParseError::CpuTime(len))
    }
}

impl From<[UserHz; CpuTime::FIELDS]> for CpuTime {
    fn from(
        [
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        ]: [UserHz; CpuTime::FIELDS],
    ) -> Self {
        Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        }
    }
}

impl From<CpuTime> for [UserHz; CpuTime::FIELDS] {
    fn from(
        CpuTime {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        }: CpuTime,
    ) -> Self {
        [
            user, nice, system, idle, iowait, irq, softirq, steal, guest, guest_nice,
        ]
    }
}
