pub mod afreecatv;
