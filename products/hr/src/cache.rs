//! Read-through cache for list and get results.
//!
//! Entries are filled only with the ticket handed out on the miss that loaded
//! them; any invalidation in between voids the ticket, so a slow read can never
//! repopulate the cache with rows a concurrent write already replaced.
//!
//! The cache is unbounded. Confirmed absences are remembered too, so a stream
//! of reads for unknown ids grows it until the next mutation clears it.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::employee::Employee;

#[derive(Debug)]
pub enum Lookup<T> {
    Hit(T),
    Miss(Ticket),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

#[derive(Debug, Default)]
pub struct ReadCache {
    state: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    generation: u64,
    list: Option<Vec<Employee>>,
    // `None` records a confirmed absence.
    employees: HashMap<i64, Option<Employee>>,
}

impl CacheState {
    fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.generation,
        }
    }
}

impl ReadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Lookup<Vec<Employee>> {
        let state = self.state.read();
        match &state.list {
            Some(employees) => Lookup::Hit(employees.clone()),
            None => Lookup::Miss(state.ticket()),
        }
    }

    pub fn fill_list(&self, ticket: Ticket, employees: Vec<Employee>) {
        let mut state = self.state.write();
        if state.ticket() == ticket {
            state.list = Some(employees);
        }
    }

    pub fn employee(&self, id: i64) -> Lookup<Option<Employee>> {
        let state = self.state.read();
        match state.employees.get(&id) {
            Some(found) => Lookup::Hit(found.clone()),
            None => Lookup::Miss(state.ticket()),
        }
    }

    pub fn fill_employee(&self, ticket: Ticket, id: i64, found: Option<Employee>) {
        let mut state = self.state.write();
        if state.ticket() == ticket {
            state.employees.insert(id, found);
        }
    }

    /// Drop every entry and void all outstanding tickets.
    pub fn invalidate_all(&self) {
        let mut state = self.state.write();
        state.generation += 1;
        state.list = None;
        state.employees.clear();
    }

    pub fn len(&self) -> usize {
        let state = self.state.read();
        state.employees.len() + usize::from(state.list.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
