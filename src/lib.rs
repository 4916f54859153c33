// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

pub mod cfg;
pub mod codecs;
pub mod ipc;
pub mod labels;
pub mod master;
pub mod robot;
pub mod service;
pub mod topic;
pub mod transport;
