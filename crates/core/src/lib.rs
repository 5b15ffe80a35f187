pub mod camera {
    pub mod domain {
        pub mod camera_source;
    }
    pub mod infrastructure;
}

pub mod display {
    pub mod domain {
        pub mod display_surface;
    }
    pub mod infrastructure;
}

pub mod server {
    pub mod domain {
        pub mod attendance_service;
    }
    pub mod infrastructure;
}

pub mod sampling {
    pub mod frame_sampler;
    pub mod snapshot_encoder;
}

pub mod shared {
    pub mod constants;
    pub mod face_box;
    pub mod frame;
    pub mod settings;
}

pub mod flows {
    pub mod enrollment_flow;
    pub mod enrollment_session;
    pub mod flow_error;
    pub mod flow_logger;
    pub mod flow_runtime;
    pub mod notices;
    pub mod recognition_monitor;
    pub mod recognition_overlay;
    pub mod response_gate;
    pub mod training_trigger;
}

#[cfg(test)]
mod test_support;
