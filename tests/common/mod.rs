use std::sync::{LazyLock, Mutex};

use flexi_logger::{Logger, LoggerHandle};

#[allow(dead_code)]
pub static LOGGER: LazyLock<Mutex<LoggerHandle>> = LazyLock::new(|| {
    Mutex::new(
        Logger::try_with_env_or_str("info")
            .unwrap()
            .write_mode(flexi_logger::WriteMode::SupportCapture)
            .log_to_stdout()
            .set_palette("196;208;3;7;8".to_owned())
            .format(|w, now, record| {
                let style = flexi_logger::style(record.level());
                write!(
                    w,
                    "{} {pref}[{}] {}{suf}",
                    now.format("%H:%M:%S"),
                    &record.level().as_str()[0..1],
                    record.args(),
                    pref = style.prefix(),
                    suf = style.suffix(),
                )
            })
            .start()
            .unwrap(),
    )
});

#[allow(dead_code)]
pub fn init_logger() {
    let _ = &*LOGGER;
}

/// A naive flood-fill reference graph, used only to cross-check `Graph`'s
/// `connected` answers in the differential stress test (spec §8.3).
#[derive(Debug, Default)]
pub struct NaiveGraph {
    adj: std::collections::HashMap<u32, std::collections::BTreeSet<u32>>,
}

#[allow(dead_code)]
impl NaiveGraph {
    pub fn insert_vertex(&mut self, v: u32) {
        self.adj.entry(v).or_default();
    }

    pub fn delete_vertex(&mut self, v: &u32) {
        let neighbors = self.adj.remove(v).unwrap_or_default();
        for w in neighbors {
            if let Some(ws) = self.adj.get_mut(&w) {
                ws.remove(v);
            }
        }
    }

    pub fn insert_edge(&mut self, u: u32, v: u32) -> bool {
        if u == v || !self.adj.contains_key(&u) || !self.adj.contains_key(&v) {
            return false;
        }
        self.adj.get_mut(&u).unwrap().insert(v) | self.adj.get_mut(&v).unwrap().insert(u)
    }

    pub fn delete_edge(&mut self, u: &u32, v: &u32) -> bool {
        let removed_u = self.adj.get_mut(u).is_some_and(|s| s.remove(v));
        let removed_v = self.adj.get_mut(v).is_some_and(|s| s.remove(u));
        removed_u || removed_v
    }

    pub fn connected(&self, u: &u32, v: &u32) -> Option<bool> {
        if !self.adj.contains_key(u) || !self.adj.contains_key(v) {
            return None;
        }
        if u == v {
            return Some(true);
        }
        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![*u];
        while let Some(x) = stack.pop() {
            if &x == v {
                return Some(true);
            }
            if seen.insert(x) {
                stack.extend(self.adj[&x].iter().copied());
            }
        }
        Some(false)
    }
}
