//! Scraping stages for the news ticker.
//!
//! Each configured source page goes through the same stages:
//!
//! 1. **Fetching** ([`fetch`]): download the page markup, or give up quietly
//! 2. **Extraction** ([`extract`]): locate candidate article blocks
//! 3. **Normalization** ([`normalize`]): clean, cap and resolve into a row
//! 4. **Relevance** ([`relevance`]): keep rows that mention a keyword
//!
//! Rows from all sources are then deduplicated and ordered once by [`rank`].
//!
//! # Extraction strategies
//!
//! | Strategy | Extractor | Notes |
//! |----------|-----------|-------|
//! | `generic` | [`extract::GenericExtractor`] | Ordered generic selectors, anchor fallback |
//! | `css: <selector>` | [`extract::CssExtractor`] | Per-source item selector, generic fallback |

pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod rank;
pub mod relevance;
