pub mod scenario_model;
