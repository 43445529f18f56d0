// src/telemetry.rs

//! Opt-in instrumentation of chain activity.
//!
//! With the `fan_telemetry` feature enabled, sends, chain initialization,
//! signal fires and thread parks are recorded into a process-wide collector
//! that can be printed with [`print_telemetry_report`]. Without the feature
//! every function here compiles to nothing.

#[cfg(feature = "fan_telemetry")]
/// The recording implementation.
pub mod enabled {
  use std::collections::HashMap;
  use std::fmt;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;
  use std::thread::{self, ThreadId};
  use std::time::Instant;

  static NEXT_EVENT_SEQUENCE_ID: AtomicUsize = AtomicUsize::new(0);

  /// A single recorded event.
  #[derive(Clone)]
  pub struct TelemetryEvent {
    /// Global sequence number across all events.
    pub seq_id: usize,
    /// When the event was recorded.
    pub timestamp: Instant,
    /// The recording thread.
    pub os_thread_id: ThreadId,
    /// Optional numeric payload, e.g. the number of woken waiters.
    pub item_id: Option<usize>,
    /// Code location, e.g. `Fan::send`.
    pub location: String,
    /// Event kind, e.g. `ChainInit`.
    pub event_type: String,
    /// Optional free-form details.
    pub message: Option<String>,
  }

  impl fmt::Debug for TelemetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("TelemetryEvent")
        .field("seq", &self.seq_id)
        .field("os_tid", &self.os_thread_id)
        .field("item_id", &self.item_id)
        .field("loc", &self.location)
        .field("evt", &self.event_type)
        .field("msg", &self.message.as_deref().unwrap_or(""))
        .finish()
    }
  }

  type CounterKey = (String, String); // (location, counter_name)

  struct CollectorData {
    events: Vec<TelemetryEvent>,
    counters: HashMap<CounterKey, usize>,
    start_time: Instant,
  }

  impl CollectorData {
    fn new() -> Self {
      CollectorData {
        events: Vec::new(),
        counters: HashMap::new(),
        start_time: Instant::now(),
      }
    }
  }

  lazy_static::lazy_static! {
      static ref GLOBAL_COLLECTOR: Mutex<CollectorData> = Mutex::new(CollectorData::new());
  }

  /// Records an event.
  pub fn log_event_fn(item_id: Option<usize>, location: &str, event_type: &str, message: Option<String>) {
    let event = TelemetryEvent {
      seq_id: NEXT_EVENT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed),
      timestamp: Instant::now(),
      os_thread_id: thread::current().id(),
      item_id,
      location: location.to_string(),
      event_type: event_type.to_string(),
      message,
    };

    if let Ok(mut collector) = GLOBAL_COLLECTOR.lock() {
      collector.events.push(event);
    } else {
      eprintln!("[TELEMETRY FAN-ERROR] Global collector mutex poisoned while recording event.");
    }
  }

  /// Increments the named counter at `location`.
  pub fn increment_counter_fn(location: &str, counter_name: &str) {
    let key = (location.to_string(), counter_name.to_string());
    if let Ok(mut collector) = GLOBAL_COLLECTOR.lock() {
      *collector.counters.entry(key).or_insert(0) += 1;
    } else {
      eprintln!("[TELEMETRY FAN-ERROR] Global collector mutex poisoned while incrementing counter.");
    }
  }

  /// Returns the current value of a counter, or 0 if it was never incremented.
  pub fn counter_value_fn(location: &str, counter_name: &str) -> usize {
    GLOBAL_COLLECTOR
      .lock()
      .ok()
      .and_then(|c| c.counters.get(&(location.to_string(), counter_name.to_string())).copied())
      .unwrap_or(0)
  }

  /// Returns a copy of all recorded events in sequence order.
  pub fn events_fn() -> Vec<TelemetryEvent> {
    let mut events = GLOBAL_COLLECTOR
      .lock()
      .map(|c| c.events.clone())
      .unwrap_or_default();
    events.sort_by_key(|e| e.seq_id);
    events
  }

  /// Prints every recorded event and counter to stdout.
  pub fn print_telemetry_report_fn() {
    if let Ok(collector) = GLOBAL_COLLECTOR.lock() {
      println!("\n--- Fan Telemetry Report (Feature: fan_telemetry) ---");
      println!("Report generated at: {:?}", Instant::now());
      println!("Collection started at: {:?}", collector.start_time);

      if collector.events.is_empty() {
        println!("\n[Events] No detailed events recorded.");
      } else {
        println!("\n[Events] Recorded Events ({}):", collector.events.len());
        let mut sorted_events = collector.events.clone();
        sorted_events.sort_by_key(|e| e.seq_id);

        for event in sorted_events.iter() {
          let time_since_start = event.timestamp.duration_since(collector.start_time);
          let os_tid_short = format!("{:?}", event.os_thread_id)
            .trim_start_matches("ThreadId(")
            .trim_end_matches(')')
            .to_string();

          println!(
            "  +{:<10.6}s [Seq:{:<5}] OS_TID:{:<6} Item:{:<6} Loc:{:<25} Evt:{:<20} Msg: {}",
            time_since_start.as_secs_f64(),
            event.seq_id,
            os_tid_short,
            event.item_id.map_or_else(|| "N/A".to_string(), |id| id.to_string()),
            event.location,
            event.event_type,
            event.message.as_deref().unwrap_or("")
          );
        }
      }

      if collector.counters.is_empty() {
        println!("\n[Counters] No counters recorded.");
      } else {
        println!("\n[Counters] Recorded Counters ({}):", collector.counters.len());
        let mut sorted_counters: Vec<_> = collector.counters.iter().collect();
        sorted_counters.sort_by_key(|(k, _v)| *k);
        for ((loc, name), count) in sorted_counters {
          println!("  Loc:{:<25} Counter:{:<20} Value: {}", loc, name, count);
        }
      }
      println!("\n--- End of Telemetry Report ---");
    } else {
      eprintln!("[TELEMETRY FAN-ERROR] Global collector mutex poisoned, cannot print report.");
    }
  }

  /// Discards all events and counters and restarts the clock.
  pub fn clear_telemetry_fn() {
    if let Ok(mut collector) = GLOBAL_COLLECTOR.lock() {
      collector.events.clear();
      collector.counters.clear();
      collector.start_time = Instant::now();
    } else {
      eprintln!("[TELEMETRY FAN-ERROR] Global collector mutex poisoned, cannot clear data.");
    }
    NEXT_EVENT_SEQUENCE_ID.store(0, Ordering::Relaxed);
  }
}

#[cfg(not(feature = "fan_telemetry"))]
pub mod disabled {
  //! No-op stand-ins used when `fan_telemetry` is off.

  /// Does nothing.
  #[inline(always)]
  pub fn log_event_fn(_item_id: Option<usize>, _location: &str, _event_type: &str, _message: Option<String>) {}
  /// Does nothing.
  #[inline(always)]
  pub fn increment_counter_fn(_location: &str, _counter_name: &str) {}
  /// Does nothing.
  #[inline(always)]
  pub fn print_telemetry_report_fn() {}
  /// Does nothing.
  #[inline(always)]
  pub fn clear_telemetry_fn() {}
}

#[cfg(feature = "fan_telemetry")]
pub use enabled::{
  clear_telemetry_fn as clear_telemetry, counter_value_fn as counter_value, events_fn as events,
  increment_counter_fn as increment_counter, log_event_fn as log_event,
  print_telemetry_report_fn as print_telemetry_report, TelemetryEvent,
};

#[cfg(not(feature = "fan_telemetry"))]
pub use disabled::{
  clear_telemetry_fn as clear_telemetry, increment_counter_fn as increment_counter,
  log_event_fn as log_event, print_telemetry_report_fn as print_telemetry_report,
};
