//
// s3-version-scan - walks the version history of an S3 bucket and summarises
//                   recent delete markers and noncurrent versions within a
//                   bounded amount of memory.
//
// Copyright (C) 2023 Jonathan Davies
// 
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
// 
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
// 
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

use anyhow::Result;
use async_trait::async_trait;

use crate::types::VersionPage;

/// A lazily produced sequence of version listing pages.
///
/// `Ok(None)` means the listing is exhausted. An `Err` does not necessarily
/// end the sequence: a source may be polled again after a failure and resume
/// from wherever it can. Retrying is the source's concern, never the
/// scanner's.
#[async_trait]
pub trait PageSource: Send {
    async fn next_page(&mut self) -> Result<Option<VersionPage>>;
}

/// Adapts an iterator of already fetched (or failed) pages.
pub struct IterPages<I> {
    pages: I,
}

impl<I> IterPages<I>
where
    I: Iterator<Item = Result<VersionPage>> + Send,
{
    pub fn new(pages: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            pages: pages.into_iter(),
        }
    }
}

#[async_trait]
impl<I> PageSource for IterPages<I>
where
    I: Iterator<Item = Result<VersionPage>> + Send,
{
    async fn next_page(&mut self) -> Result<Option<VersionPage>> {
        self.pages.next().transpose()
    }
}
