//! Background tile loader
//!
//! One long-lived thread pops coordinates off a queue, loads and classifies
//! them without holding the lock, and leaves the results for the render
//! thread to pick up. Everything shared lives behind a single mutex; the
//! condvar wakes the worker when work arrives and wakes the render thread
//! when a load finishes.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::tile::{LoadedTile, TileCoords, TileError, TileSource};

/// Result of one background load
pub(crate) type LoadResult = Result<LoadedTile, TileError>;

#[derive(Default)]
pub(crate) struct LoaderState {
    /// This frame's wishlist, front first
    pub queue: VecDeque<TileCoords>,
    /// Coordinate the worker is loading right now
    pub loading: Option<TileCoords>,
    /// Finished loads waiting to be drained
    pub loaded: Vec<(TileCoords, LoadResult)>,
    finish: bool,
}

impl LoaderState {
    /// Take a finished result for one coordinate, if there is one
    pub fn take_loaded(&mut self, coords: TileCoords) -> Option<LoadResult> {
        let pos = self.loaded.iter().position(|(c, _)| *c == coords)?;
        Some(self.loaded.swap_remove(pos).1)
    }

    pub fn is_loaded(&self, coords: TileCoords) -> bool {
        self.loaded.iter().any(|(c, _)| *c == coords)
    }
}

struct Shared {
    state: Mutex<LoaderState>,
    condvar: Condvar,
}

pub(crate) struct Loader {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl Loader {
    /// Start the worker thread
    pub fn spawn(source: Arc<dyn TileSource>, tile_size: u32) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(LoaderState::default()),
            condvar: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let thread = thread::Builder::new()
            .name("tile-loader".into())
            .spawn(move || run(&worker_shared, source.as_ref(), tile_size))?;

        log::debug!("tile loader started");
        Ok(Self {
            shared,
            thread: Some(thread),
        })
    }

    pub fn lock(&self) -> MutexGuard<'_, LoaderState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the worker is no longer loading `coords`
    pub fn wait_for<'a>(
        &'a self,
        guard: MutexGuard<'a, LoaderState>,
        coords: TileCoords,
    ) -> MutexGuard<'a, LoaderState> {
        self.shared
            .condvar
            .wait_while(guard, |state| state.loading == Some(coords))
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Wake the worker to look at the queue
    pub fn notify(&self) {
        self.shared.condvar.notify_all();
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        self.lock().finish = true;
        self.notify();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("tile loader thread panicked");
            }
        }
        log::debug!("tile loader stopped");
    }
}

fn run(shared: &Shared, source: &dyn TileSource, tile_size: u32) {
    let mut state = shared.state.lock().unwrap_or_else(PoisonError::into_inner);
    loop {
        state = shared
            .condvar
            .wait_while(state, |s| s.queue.is_empty() && !s.finish)
            .unwrap_or_else(PoisonError::into_inner);

        if state.finish {
            return;
        }

        let Some(coords) = state.queue.pop_front() else {
            continue;
        };
        state.loading = Some(coords);
        drop(state);

        // Slow part: file read, decode, classification. No renderer access
        // here, the result is CPU data only. A panic must still clear
        // `loading`, or a render thread waiting on this tile never wakes.
        let result = panic::catch_unwind(AssertUnwindSafe(|| LoadedTile::load(source, coords, tile_size)))
            .unwrap_or(Err(TileError::LoaderPanic { coords }));
        if let Err(e) = &result {
            log::warn!("background load of tile {} failed: {}", coords, e);
        }

        state = shared.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.loaded.push((coords, result));
        state.loading = None;

        // The render thread may be waiting for exactly this tile
        shared.condvar.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{MemorySource, TileImage};
    use std::time::Duration;

    fn wait_until_idle(loader: &Loader) {
        for _ in 0..2000 {
            {
                let state = loader.lock();
                if state.queue.is_empty() && state.loading.is_none() {
                    return;
                }
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("loader never went idle");
    }

    #[test]
    fn test_worker_loads_queue_in_order() {
        let source = MemorySource::new()
            .with_tile(TileCoords::new(0, 0), TileImage::from_fn(4, |_, _| [0, 0, 0, 255]));
        let loader = Loader::spawn(Arc::new(source), 4).unwrap();

        {
            let mut state = loader.lock();
            state.queue.push_back(TileCoords::new(0, 0));
            state.queue.push_back(TileCoords::new(1, 0));
        }
        loader.notify();
        wait_until_idle(&loader);

        let mut state = loader.lock();
        let loaded: Vec<_> = state.loaded.iter().map(|(c, _)| *c).collect();
        assert_eq!(loaded, vec![TileCoords::new(0, 0), TileCoords::new(1, 0)]);

        let air = state.take_loaded(TileCoords::new(1, 0)).unwrap().unwrap();
        assert!(air.is_empty());
        assert!(!state.is_loaded(TileCoords::new(1, 0)));
        assert!(state.is_loaded(TileCoords::new(0, 0)));
    }

    /// Source whose every fetch panics
    struct Exploding;

    impl TileSource for Exploding {
        fn fetch(&self, coords: TileCoords) -> Result<Option<TileImage>, TileError> {
            panic!("tile {} exploded", coords);
        }
    }

    #[test]
    fn test_worker_survives_panicking_load() {
        let loader = Loader::spawn(Arc::new(Exploding), 4).unwrap();
        {
            let mut state = loader.lock();
            state.queue.push_back(TileCoords::new(2, 2));
            state.queue.push_back(TileCoords::new(3, 2));
        }
        loader.notify();
        wait_until_idle(&loader);

        let mut state = loader.lock();
        assert!(state.loading.is_none());
        assert!(matches!(
            state.take_loaded(TileCoords::new(2, 2)),
            Some(Err(TileError::LoaderPanic { .. }))
        ));
        assert!(matches!(
            state.take_loaded(TileCoords::new(3, 2)),
            Some(Err(TileError::LoaderPanic { .. }))
        ));
    }

    #[test]
    fn test_drop_stops_idle_worker() {
        let loader = Loader::spawn(Arc::new(MemorySource::new()), 4).unwrap();
        drop(loader);
    }
}
