pub mod configuration;

pub mod fourier {
    pub mod fouriererror;
    pub mod fouriercoefficients;
    pub mod fouriercalculator;
}

pub mod math {
    pub mod curve {
        pub mod curve;
        pub mod targetfunction;
        pub mod nonparametriccurve {
            pub mod nonparametriccurve;
            pub mod piecewisepolynomial;
            pub mod sampledcurve;
        }
    }

    pub mod quadrature {
        pub mod quadrature;
        pub mod gausskronrod;
    }
}

pub mod server {
    pub mod corspolicy;
    pub mod servererror;
    pub mod state;
    pub mod handler;
    pub mod server;
}
