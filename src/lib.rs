#![warn(clippy::all)]

//! Navigation mesh and cross-room routing for Screeps.
//!
//! Each room is reduced to its border exits, the interior regions those exits open into and the
//! tile distances between them (`mesh`). Routes between rooms are then found by a best-first
//! search over exits (`pathing::router`) rather than over individual tiles.

pub mod features;
pub mod logging;
pub mod mesh;
pub mod pathing;
pub mod position;
pub mod room;
pub mod serialize;

#[cfg(feature = "screeps")]
mod game_loop;
#[cfg(feature = "screeps")]
pub mod screepsinterface;

#[cfg(feature = "screeps")]
mod exports {
    use super::*;
    use log::*;
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen(js_name = setup)]
    pub fn setup(username: String, features_json: Option<String>) {
        logging::setup_logging(logging::Info);

        let features = match features_json.as_deref().map(features::load) {
            Some(Ok(features)) => features,
            Some(Err(err)) => {
                warn!("Invalid navigation features, using defaults: {}", err);
                features::Features::default()
            }
            None => features::Features::default(),
        };

        game_loop::setup(username, features);
    }

    #[wasm_bindgen(js_name = game_loop)]
    pub fn game_loop_export() {
        #[cfg(feature = "profile")]
        {
            screeps_timing::start_trace(Box::new(|| (screeps::game::cpu::get_used() * 1000.0) as u64));
        }

        game_loop::tick();

        #[cfg(feature = "profile")]
        {
            let trace = screeps_timing::stop_trace();

            if let Ok(trace_output) = serde_json::to_string(&trace) {
                debug!("{}", trace_output);
            }
        }
    }

    #[wasm_bindgen(js_name = find_route)]
    pub fn find_route(start: String, end: String, allow_danger: bool) -> Option<Vec<String>> {
        match game_loop::find_route(&start, &end, allow_danger) {
            Ok(path) => path,
            Err(err) => {
                error!("Failed to route from {} to {}: {}", start, end, err);
                None
            }
        }
    }
}
