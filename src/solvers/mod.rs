pub mod euler2d_plm;
