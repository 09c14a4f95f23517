// Copyright (c) 2022 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use common::{
    chain::{Block, ChainConfig, Destination},
    primitives::{amount::sum_amounts, Amount},
};

use crate::detail::{CheckBlockError, StructuralError};

/// The proof-of-work outputs, after the tax and height commitment, pay exactly the work subsidy
pub fn check_work_subsidy(chain_config: &ChainConfig, block: &Block) -> Result<(), CheckBlockError> {
    let coinbase = block.coinbase().ok_or(StructuralError::FirstTxNotCoinbase)?;

    let expected = chain_config.work_subsidy(block.height(), block.voters());
    let paid = sum_amounts(coinbase.outputs().iter().skip(2).map(|output| output.value()))
        .ok_or(StructuralError::CoinbaseValueOverflow)?;

    if paid != expected {
        return Err(CheckBlockError::BadCoinbaseValue { expected, paid });
    }
    Ok(())
}

/// The first coinbase output pays the tax subsidy to the treasury
pub fn check_tax(chain_config: &ChainConfig, block: &Block) -> Result<(), CheckBlockError> {
    let coinbase = block.coinbase().ok_or(StructuralError::FirstTxNotCoinbase)?;
    let tax_output =
        coinbase.outputs().first().ok_or(StructuralError::BadCoinbaseStructure)?;

    let expected = chain_config.tax_subsidy(block.height(), block.voters());
    let paid = paid_to(tax_output.destination(), chain_config.tax_destination(), tax_output.value());

    if tax_output.destination() != chain_config.tax_destination() || paid != expected {
        return Err(CheckBlockError::NoTax { expected, paid });
    }
    Ok(())
}

fn paid_to(destination: &Destination, treasury: &Destination, value: Amount) -> Amount {
    if destination == treasury {
        value
    } else {
        Amount::from_atoms(0)
    }
}
