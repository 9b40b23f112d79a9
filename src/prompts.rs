//! Canned example cases that can be loaded into the query input.

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SamplePrompt {
    /// 車禍: traffic accident liability
    Traffic,
    /// 租屋: early termination of a lease
    Tenancy,
    /// 罵人: public insult online
    Insult,
    /// 勞資: illegal wage deductions
    Labor,
}

impl SamplePrompt {
    pub const ALL: [SamplePrompt; 4] = [
        SamplePrompt::Traffic,
        SamplePrompt::Tenancy,
        SamplePrompt::Insult,
        SamplePrompt::Labor,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SamplePrompt::Traffic => "車禍",
            SamplePrompt::Tenancy => "租屋",
            SamplePrompt::Insult => "罵人",
            SamplePrompt::Labor => "勞資",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            SamplePrompt::Traffic => "我昨天開車綠燈直行，結果被一台闖紅燈的機車撞到側面，對方骨折但我沒事。現在對方說我是開車的「應注意而未注意」，要求我賠償醫藥費跟精神損失，請問我真的要賠嗎？",
            SamplePrompt::Tenancy => "我租約還沒到期，但房東說要把房子賣掉，叫我下個月底前搬走，還說如果不搬就要扣我押金，請問這樣合法嗎？我可以要求違約金嗎？",
            SamplePrompt::Insult => "我在網路上跟人吵架，對方在公開留言區罵我「腦殘」、「生兒子沒屁眼」，我覺得受辱，請問可以告他什麼？",
            SamplePrompt::Labor => "我是飲料店員工，老闆規定如果做錯飲料要扣薪水 500 元，結果我上個月薪水被扣了 2000 元，低於基本工資，請問老闆這樣違反勞基法嗎？",
        }
    }
}
