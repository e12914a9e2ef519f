// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod test_segment;
pub(crate) mod utils;
