mod blocking;
mod distribution;
mod scenario_spec;
mod server_selection;
