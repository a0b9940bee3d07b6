//! # lsb_lens 库
//!
//! 本库包含 LSB 隐写分析流水线的核心逻辑：
//! 灰度归一化、位平面分解与重建、网格总览图渲染，
//! 以及亮度直方图的统计与对比。

// 声明库包含的所有模块。

pub mod bitplane;
pub mod cli;
pub mod composite;
pub mod constants;
pub mod error;
pub mod grouping;
pub mod handler;
pub mod histogram;
pub mod label;
pub mod metrics;
pub mod normalize;
pub mod raster;
